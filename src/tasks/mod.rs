pub mod record;
pub mod serve;
