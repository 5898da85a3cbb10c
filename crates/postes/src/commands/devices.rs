//! Concentrator listing for one substation.

use tabled::Tabled;

use postes_core::{DeviceEntry, Engine, SubstationDevices, SubstationId};

use crate::error::CliError;
use crate::output;

use super::OutputOpts;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Operator")]
    operator: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Installed")]
    installed: String,
}

impl From<&DeviceEntry> for DeviceRow {
    fn from(d: &DeviceEntry) -> Self {
        Self {
            serial: d.numero_serie.to_string(),
            model: output::or_dash(d.modele.as_deref()),
            operator: d.operateur.clone(),
            status: d.etat.to_string(),
            installed: d
                .date_pose
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d").to_string()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(engine: &Engine, id: SubstationId, opts: OutputOpts) -> Result<(), CliError> {
    let listing = engine.substation_devices(id).await?;
    let out = output::render_single(opts.format, &listing, detail, plain)?;
    output::print_output(&out, opts.quiet);
    Ok(())
}

fn detail(listing: &SubstationDevices) -> String {
    let poste = &listing.poste;
    let header = match poste.nom_poste.as_deref() {
        Some(name) => format!("{} {name} (#{})", poste.code_poste, poste.id_poste),
        None => format!("{} (#{})", poste.code_poste, poste.id_poste),
    };
    if listing.concentrateurs.is_empty() {
        return format!("{header}\nNo concentrators assigned.");
    }
    let rows: Vec<DeviceRow> = listing.concentrateurs.iter().map(DeviceRow::from).collect();
    format!("{header}\n{}", output::render_table(&rows))
}

fn plain(listing: &SubstationDevices) -> String {
    listing
        .concentrateurs
        .iter()
        .map(|d| d.numero_serie.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
