// MotionWatch: Wi-Fi Station
//
// ESP-IDF station interface with a fixed SSID/password pair.

use anyhow::anyhow;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use crate::network::Network;

pub struct WifiStation<'d> {
    wifi: BlockingWifi<EspWifi<'d>>,
}

impl<'d> WifiStation<'d> {
    /// Configure and start the radio. Association is left to [`Network::connect`].
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        ssid: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sys_loop.clone(), nvs)?, sys_loop)?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| anyhow!("SSID too long: {}", ssid))?,
            password: password
                .try_into()
                .map_err(|_| anyhow!("Wi-Fi password too long"))?,
            auth_method,
            ..Default::default()
        }))?;
        wifi.start()?;
        log::info!("Wi-Fi started, station for \"{}\"", ssid);

        Ok(Self { wifi })
    }
}

impl Network for WifiStation<'_> {
    fn connect(&mut self) -> anyhow::Result<()> {
        self.wifi.wifi_mut().connect()?;
        Ok(())
    }

    /// Associated and holding an IP lease.
    fn is_connected(&mut self) -> anyhow::Result<bool> {
        Ok(self.wifi.is_up()?)
    }

    fn address(&mut self) -> Option<String> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip.to_string())
    }
}
