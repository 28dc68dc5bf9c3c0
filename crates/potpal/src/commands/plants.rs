//! Plant commands: the cloud list plus the offline reference library.

use std::sync::Arc;

use tabled::Tabled;
use tracing::warn;

use potpal_core::{DocumentId, Plant, PlantDraft};

use crate::cli::{GlobalOpts, PlantsCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PlantRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Watering")]
    watering: String,
    #[tabled(rename = "Last reading")]
    reading: String,
}

fn to_row(plant: &Arc<Plant>) -> PlantRow {
    PlantRow {
        id: plant.id.to_string(),
        name: plant.display_name.clone(),
        category: plant.category.to_string(),
        watering: plant.watering_frequency.clone(),
        reading: plant
            .last_reading
            .as_ref()
            .map(|r| r.to_string().replace('\n', ", "))
            .unwrap_or_default(),
    }
}

fn render(global: &GlobalOpts, plants: &[Arc<Plant>]) {
    if plants.is_empty() {
        println!("No plants yet.");
        return;
    }
    let rendered = output::render_list(global.output, plants, to_row, |p| p.id.to_string());
    output::print_output(&rendered);
}

pub async fn handle(cmd: PlantsCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        PlantsCommand::List { watch } => {
            super::with_session(global, |session| async move {
                render(global, &session.plants_snapshot());

                if watch {
                    let mut stream = session.plants();
                    while let Some(snapshot) = stream.changed().await {
                        println!();
                        render(global, &snapshot);
                    }
                }
                Ok(())
            })
            .await
        }

        PlantsCommand::Add {
            name,
            category,
            no_lookup,
        } => {
            let draft = build_draft(&name, category.into(), no_lookup, global).await?;
            super::with_session(global, |session| async move {
                session.add_plant(&draft).await?;
                Ok(())
            })
            .await?;
            output::ok_line(
                output::should_color(global.color),
                &format!("Added {name}"),
            );
            Ok(())
        }

        PlantsCommand::Remove { id } => {
            super::with_session(global, |session| async move {
                session.delete_plant(&DocumentId::from(id.as_str())).await?;
                Ok(())
            })
            .await?;
            output::ok_line(output::should_color(global.color), "Plant removed");
            Ok(())
        }

        PlantsCommand::Info { name } => {
            let store = config::local_store().await?;
            let Some(sheet) = store.reference_plant(&name).await? else {
                return Err(CliError::NotFound {
                    what: "reference plant".into(),
                    id: name,
                });
            };

            let rendered = output::render_single(
                global.output,
                &sheet,
                |s| {
                    format!(
                        "{} ({})\n  Watering: {}\n  Sunlight: {}\n  Soil:     {}\n  Notes:    {}",
                        s.name,
                        s.category,
                        s.watering,
                        s.sunlight,
                        s.soil,
                        s.notes.as_deref().unwrap_or("-"),
                    )
                },
                |s| s.name.clone(),
            );
            output::print_output(&rendered);
            Ok(())
        }
    }
}

/// Assemble the plant draft, prefilling care fields from the care-guide
/// service or, failing that, the offline reference library. Lookup
/// failures are non-fatal: the plant is still added with empty fields.
async fn build_draft(
    name: &str,
    category: potpal_core::PlantCategory,
    no_lookup: bool,
    global: &GlobalOpts,
) -> Result<PlantDraft, CliError> {
    let mut draft = PlantDraft::named(name, category);
    if no_lookup {
        return Ok(draft);
    }

    let resolved = config::resolve(global);
    if let Some(client) = config::care_guide_client(&resolved, global)? {
        match client.plant_info(name).await {
            Ok(guide) => {
                draft.watering_amount = guide.water;
                draft.sunlight_needs = guide.sun;
                draft.care_instructions = [guide.soil, guide.harvest, guide.extra_care]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                return Ok(draft);
            }
            Err(e) => warn!(error = %e, "care-guide lookup failed; trying the local library"),
        }
    }

    let store = config::local_store().await?;
    if let Some(sheet) = store.reference_plant(name).await? {
        draft.watering_frequency = sheet.watering;
        draft.sunlight_needs = sheet.sunlight;
        draft.care_instructions = sheet.notes.unwrap_or_default();
    }

    Ok(draft)
}
