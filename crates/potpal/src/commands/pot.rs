//! Smart-pot pairing and control.
//!
//! The radio path runs against the simulated adapter (no pot hardware
//! required); the Wi-Fi path drives the simulated command channel.

use std::time::Duration;

use tabled::Tabled;
use tokio::sync::watch;

use potpal_core::{
    AdapterState, DeviceError, DeviceLink, DiscoveredPot, LinkState, PotChannel, PotId,
    SimulatedRadio,
};
use potpal_local::PotRecord;

use crate::cli::{GlobalOpts, PotCommand, WateringMode};
use crate::config;
use crate::error::CliError;
use crate::output;

const ADAPTER_DEADLINE: Duration = Duration::from_secs(5);
const CONNECT_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Tabled)]
struct PotListRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Signal")]
    rssi: String,
}

fn discovery_row(pot: &DiscoveredPot) -> PotListRow {
    PotListRow {
        address: pot.id.to_string(),
        name: pot.label().to_owned(),
        rssi: format!("{} dBm", pot.rssi),
    }
}

#[derive(Tabled)]
struct PairedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    plant_type: String,
    #[tabled(rename = "Last watered")]
    last_watered: String,
}

/// Wait on a watch channel until `pred` holds, with a deadline.
async fn wait_for<T: Clone>(
    rx: &mut watch::Receiver<T>,
    what: &str,
    deadline: Duration,
    pred: impl FnMut(&T) -> bool,
) -> Result<T, CliError> {
    let value = tokio::time::timeout(deadline, rx.wait_for(pred))
        .await
        .map_err(|_| CliError::Timeout { what: what.into() })?
        .map_err(|_| CliError::Timeout { what: what.into() })?
        .clone();
    Ok(value)
}

async fn powered_link() -> Result<DeviceLink<SimulatedRadio>, CliError> {
    let (radio, events) = SimulatedRadio::new(SimulatedRadio::demo_pots());
    let link = DeviceLink::new(radio, events);

    let mut adapter = link.adapter_state();
    wait_for(&mut adapter, "radio power-on", ADAPTER_DEADLINE, |s| {
        *s == AdapterState::PoweredOn
    })
    .await?;
    Ok(link)
}

pub async fn handle(cmd: PotCommand, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match cmd {
        PotCommand::Scan { seconds } => {
            let link = powered_link().await?;
            link.start_scan()?;
            output::status_line(color, "Scanning...");
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            link.stop_scan();

            let discovered = link.discovered_snapshot();
            if discovered.is_empty() {
                println!("No pots found.");
            } else {
                let rendered = output::render_list(
                    global.output,
                    &discovered,
                    discovery_row,
                    |p| p.id.to_string(),
                );
                output::print_output(&rendered);
            }
            link.shutdown();
            Ok(())
        }

        PotCommand::Pair { id, name, category } => {
            let link = powered_link().await?;
            let target = PotId::from(id.as_str());

            // Scan until the target shows up so the connect has a fresh
            // discovery entry (and a label) to work with.
            link.start_scan()?;
            let mut discovered = link.discovered();
            let found = wait_for(&mut discovered, "pot discovery", CONNECT_DEADLINE, |pots| {
                pots.iter().any(|p| p.id == target)
            })
            .await;
            if found.is_err() {
                link.shutdown();
                return Err(CliError::NotFound {
                    what: "pot".into(),
                    id,
                });
            }

            link.connect(&target)?;
            output::status_line(color, "Connecting...");

            let mut state = link.link_state();
            let outcome = wait_for(&mut state, "pot connection", CONNECT_DEADLINE, |s| {
                matches!(s, LinkState::Connected | LinkState::Failed)
            })
            .await?;

            if outcome == LinkState::Failed {
                let reason = link
                    .last_error()
                    .unwrap_or_else(|| "unknown error".to_owned());
                link.shutdown();
                return Err(DeviceError::ConnectFailed { reason }.into());
            }

            let label = name.unwrap_or_else(|| {
                link.discovered_snapshot()
                    .iter()
                    .find(|p| p.id == target)
                    .map_or_else(|| target.to_string(), |p| p.label().to_owned())
            });

            let store = config::local_store().await?;
            let record = PotRecord::new(
                label.clone(),
                potpal_core::PlantCategory::from(category).to_string(),
            );
            store.save_pot(&record).await?;

            output::ok_line(color, &format!("Paired {label} ({})", record.id));
            link.disconnect()?;
            link.shutdown();
            Ok(())
        }

        PotCommand::List => {
            let store = config::local_store().await?;
            let pots = store.pots().await?;
            if pots.is_empty() {
                println!("No paired pots.");
                return Ok(());
            }

            let rendered = output::render_list(
                global.output,
                &pots,
                |p| PairedRow {
                    id: p.id.to_string(),
                    name: p.name.clone(),
                    plant_type: p.plant_type.clone(),
                    last_watered: p.last_watered.format("%Y-%m-%d %H:%M").to_string(),
                },
                |p| p.id.to_string(),
            );
            output::print_output(&rendered);
            Ok(())
        }

        PotCommand::Unpair { id } => {
            let store = config::local_store().await?;
            if !store.remove_pot(id).await? {
                return Err(CliError::NotFound {
                    what: "paired pot".into(),
                    id: id.to_string(),
                });
            }
            output::ok_line(color, "Pot forgotten");
            Ok(())
        }

        PotCommand::Wifi {
            address,
            mode,
            fetch,
        } => {
            let channel = PotChannel::new();
            let mut status = channel.status();

            channel.connect(&address)?;
            output::status_line(color, &channel.current_status());

            let line = wait_for(&mut status, "pot connection", CONNECT_DEADLINE, |s| {
                s.starts_with("Connected")
            })
            .await?;
            output::ok_line(color, &line);
            print_reading(&channel);

            if let Some(mode) = mode {
                channel.send_mode_command(mode == WateringMode::Automatic)?;
                let line = wait_for(&mut status, "mode acknowledgment", CONNECT_DEADLINE, |s| {
                    s.contains("mode set")
                })
                .await?;
                output::ok_line(color, &line);
            }

            if fetch {
                channel.fetch_data()?;
                wait_for(&mut status, "sensor report", CONNECT_DEADLINE, |s| {
                    s.starts_with("Connected")
                })
                .await?;
                print_reading(&channel);
            }

            Ok(())
        }
    }
}

fn print_reading(channel: &PotChannel) {
    if let Some(reading) = channel.last_reading().borrow().clone() {
        println!("{reading}");
    }
}
