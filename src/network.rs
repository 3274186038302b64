// MotionWatch: Network Bring-up
//
// Start station association, then poll a bounded number of times for the
// link to come up. Failing to associate is fatal at startup.

use std::thread;
use std::time::Duration;

use crate::error::Error;

/// A station interface that can associate with an access point.
pub trait Network {
    /// Begin association; does not wait for it to complete.
    fn connect(&mut self) -> anyhow::Result<()>;

    fn is_connected(&mut self) -> anyhow::Result<bool>;

    /// Address to report once associated.
    fn address(&mut self) -> Option<String> {
        None
    }
}

/// Connect and wait up to `attempts` polls, `spacing` apart.
pub fn associate<N: Network>(net: &mut N, attempts: u32, spacing: Duration) -> Result<(), Error> {
    if let Err(e) = net.connect() {
        log::error!("Wi-Fi connect request failed: {:#}", e);
        return Err(Error::NetworkUnavailable {
            attempts: 0,
            cause: Some(e.into()),
        });
    }

    let mut remaining = attempts;
    while remaining > 0 {
        if link_up(net) {
            break;
        }
        remaining -= 1;
        log::info!("Waiting for Wi-Fi connection…");
        thread::sleep(spacing);
    }

    if !link_up(net) {
        log::error!("Failed to establish a network connection");
        return Err(Error::NetworkUnavailable { attempts, cause: None });
    }

    match net.address() {
        Some(addr) => log::info!("Connected, IP address: {}", addr),
        None => log::info!("Connected"),
    }
    Ok(())
}

fn link_up<N: Network>(net: &mut N) -> bool {
    net.is_connected().unwrap_or_else(|e| {
        log::warn!("Wi-Fi status query failed: {}", e);
        false
    })
}
