//! Substation command handlers: list, show, summary, owners.

use std::fmt::Write as _;

use tabled::Tabled;

use postes_core::{Engine, FleetSummary, SubstationFilter, SubstationId, SubstationView};

use crate::cli::FilterArgs;
use crate::error::CliError;
use crate::output;

use super::OutputOpts;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SubstationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "BO")]
    owner: String,
    #[tabled(rename = "Coordinates")]
    coordinates: String,
    #[tabled(rename = "Total")]
    total: u64,
    #[tabled(rename = "Posés")]
    pose: u64,
    #[tabled(rename = "À tester")]
    a_tester: u64,
    #[tabled(rename = "State")]
    marker: String,
}

impl SubstationRow {
    fn new(v: &SubstationView, color: bool) -> Self {
        Self {
            id: v.id_poste.get(),
            code: v.code_poste.clone(),
            name: output::or_dash(v.nom_poste.as_deref()),
            owner: output::or_dash(v.bo_affectee.as_deref()),
            coordinates: format_coordinates(v),
            total: v.nb_concentrateurs,
            pose: v.nb_concentrateurs_pose,
            a_tester: v.nb_concentrateurs_a_tester,
            marker: output::marker_label(v.marker(), color),
        }
    }
}

#[derive(Tabled)]
struct OwnerRow {
    #[tabled(rename = "BO")]
    owner: String,
}

fn format_coordinates(v: &SubstationView) -> String {
    match (v.latitude, v.longitude) {
        (Some(lat), Some(lon)) => format!("{lat:.5}, {lon:.5}"),
        _ => "-".into(),
    }
}

fn filter_from(args: &FilterArgs) -> Result<SubstationFilter, CliError> {
    Ok(SubstationFilter::new(args.owner.as_deref(), args.with_coords)?)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(engine: &Engine, args: &FilterArgs, opts: OutputOpts) -> Result<(), CliError> {
    let filter = filter_from(args)?;
    let views = engine.list(&filter).await?;
    let out = output::render_list(
        opts.format,
        &views,
        |v| SubstationRow::new(v, opts.color),
        |v| v.id_poste.to_string(),
    )?;
    output::print_output(&out, opts.quiet);
    Ok(())
}

pub async fn show(engine: &Engine, id: SubstationId, opts: OutputOpts) -> Result<(), CliError> {
    let view = engine.substation(id).await?;
    let out = output::render_single(
        opts.format,
        &view,
        |v| detail(v, opts.color),
        |v| v.id_poste.to_string(),
    )?;
    output::print_output(&out, opts.quiet);
    Ok(())
}

pub async fn summary(engine: &Engine, args: &FilterArgs, opts: OutputOpts) -> Result<(), CliError> {
    let filter = filter_from(args)?;
    let summary = engine.summary(&filter).await?;
    let out = output::render_single(opts.format, &summary, summary_detail, summary_plain)?;
    output::print_output(&out, opts.quiet);
    Ok(())
}

pub async fn owners(engine: &Engine, opts: OutputOpts) -> Result<(), CliError> {
    let owners = engine.owners().await?;
    let out = output::render_list(
        opts.format,
        &owners,
        |o| OwnerRow { owner: o.clone() },
        Clone::clone,
    )?;
    output::print_output(&out, opts.quiet);
    Ok(())
}

// ── Detail views ────────────────────────────────────────────────────

fn detail(v: &SubstationView, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:           {}", v.id_poste);
    let _ = writeln!(out, "Code:         {}", v.code_poste);
    let _ = writeln!(out, "Name:         {}", output::or_dash(v.nom_poste.as_deref()));
    let _ = writeln!(out, "Location:     {}", output::or_dash(v.localisation.as_deref()));
    let _ = writeln!(out, "BO:           {}", output::or_dash(v.bo_affectee.as_deref()));
    let _ = writeln!(out, "Coordinates:  {}", format_coordinates(v));
    let _ = writeln!(out, "State:        {}", output::marker_label(v.marker(), color));
    let _ = writeln!(out, "Concentrators:");
    let _ = writeln!(out, "  total:      {}", v.nb_concentrateurs);
    let _ = writeln!(out, "  pose:       {}", v.nb_concentrateurs_pose);
    let _ = writeln!(out, "  a_tester:   {}", v.nb_concentrateurs_a_tester);
    let other = v.counts().other();
    if other > 0 {
        let _ = writeln!(out, "  other:      {other}");
    }
    out.trim_end().to_owned()
}

fn summary_detail(s: &FleetSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Substations:        {}", s.nb_postes);
    let _ = writeln!(out, "  geolocated:       {}", s.nb_postes_geolocalises);
    let _ = writeln!(out, "Concentrators:      {}", s.nb_concentrateurs);
    let _ = writeln!(out, "  pose:             {}", s.nb_concentrateurs_pose);
    let _ = writeln!(out, "  a_tester:         {}", s.nb_concentrateurs_a_tester);
    let _ = writeln!(out, "  other:            {}", s.nb_concentrateurs_autres);
    if !s.par_etat.is_empty() {
        let _ = writeln!(out, "By status:");
        for (status, count) in &s.par_etat {
            let _ = writeln!(out, "  {status:<18}{count}");
        }
    }
    out.trim_end().to_owned()
}

fn summary_plain(s: &FleetSummary) -> String {
    [
        format!("nb_postes={}", s.nb_postes),
        format!("nb_postes_geolocalises={}", s.nb_postes_geolocalises),
        format!("nb_concentrateurs={}", s.nb_concentrateurs),
        format!("nb_concentrateurs_pose={}", s.nb_concentrateurs_pose),
        format!("nb_concentrateurs_a_tester={}", s.nb_concentrateurs_a_tester),
        format!("nb_concentrateurs_autres={}", s.nb_concentrateurs_autres),
    ]
    .join("\n")
}
