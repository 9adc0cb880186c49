//! Plan report rendering
//!
//! Plain-text tables written to any [`core::fmt::Write`] sink: the step
//! listing, the reservoir preparation table and the bulk reagent summary
//! for every part, followed by the scheduled hold time.

use core::fmt::{self, Write};

use heapless::String;

use crate::compiler::{PlanPart, SynthesisPlan};
use crate::protocol::estimate_hold_seconds;
use crate::volume::{BulkVolumes, ReportLine};

const RULE: &str = "------------------------------------------------------------";

/// Render the full pre-run report
pub fn write_plan<W: Write>(w: &mut W, plan: &SynthesisPlan) -> fmt::Result {
    let parts = plan.parts().len();
    for (i, part) in plan.parts().iter().enumerate() {
        if parts > 1 {
            writeln!(w, "Part {} of {}", i + 1, parts)?;
        }
        write_reagents(w, part)?;
        writeln!(w)?;
        write_steps(w, part)?;
        writeln!(w)?;
        write_bulk(w, &part.bulk)?;
        writeln!(w)?;
    }

    match estimate_hold_seconds(plan) {
        Ok(seconds) => writeln!(
            w,
            "Estimated run time: {}h {:02}m",
            seconds / 3600,
            seconds % 3600 / 60
        ),
        Err(_) => writeln!(w, "Estimated run time: unavailable"),
    }
}

/// Step listing in synthesis order
pub fn write_steps<W: Write>(w: &mut W, part: &PlanPart) -> fmt::Result {
    writeln!(w, "{}", RULE)?;
    writeln!(
        w,
        "{:<6}{:<8}{:<6}{:<12}{}",
        "No.", "Symbol", "Port", "Coupling", "Deprotection"
    )?;
    writeln!(w, "{}", RULE)?;
    for step in &part.steps {
        writeln!(
            w,
            "{:<6}{:<8}{:<6}{:<12}{}",
            step.index,
            step.symbol.as_char(),
            step.port,
            step.coupling.as_str(),
            step.deprotection.as_str()
        )?;
    }
    writeln!(w, "{}", RULE)
}

/// Reservoir preparation table
pub fn write_reagents<W: Write>(w: &mut W, part: &PlanPart) -> fmt::Result {
    writeln!(w, "{}", RULE)?;
    writeln!(
        w,
        "{:<10}{:<6}{:<12}{:<10}{}",
        "Reagent", "Port", "Solution", "Weight", "DMF"
    )?;
    writeln!(w, "{}", RULE)?;
    for line in &part.reagents {
        write_reagent_line(w, line)?;
    }
    writeln!(w, "{}", RULE)
}

fn write_reagent_line<W: Write>(w: &mut W, line: &ReportLine) -> fmt::Result {
    let mut label: String<12> = String::new();
    write!(label, "{}({})", line.symbol.as_char(), line.uses)?;

    let mut volume: String<16> = String::new();
    write!(volume, "{:.1} ml", line.volume_ml())?;

    let mut mass: String<16> = String::new();
    write!(mass, "{:.0} mg", line.mass_mg)?;

    writeln!(
        w,
        "{:<10}{:<6}{:<12}{:<10}{:.0} ul",
        label.as_str(),
        line.port,
        volume.as_str(),
        mass.as_str(),
        line.diluent_ul
    )
}

/// Bulk solvent and activator volumes
pub fn write_bulk<W: Write>(w: &mut W, bulk: &BulkVolumes) -> fmt::Result {
    let rows = [
        ("DMF", bulk.dmf_ul),
        ("DCM", bulk.dcm_ul),
        ("HBTU solution", bulk.hbtu_ul),
        ("HOBt solution", bulk.hobt_ul),
        ("DIPEA solution", bulk.dipea_ul),
        ("Piperidine solution", bulk.piperidine_ul),
    ];
    for (name, ul) in rows {
        writeln!(w, "Volume of {} = {:.1} ml", name, ul as f32 / 1000.0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceConfig, SynthesisConfig};

    fn plan(seq: &str) -> SynthesisPlan {
        let mut sequence = heapless::String::new();
        let _ = sequence.push_str(seq);
        let synthesis = SynthesisConfig {
            sequence,
            ..Default::default()
        };
        SynthesisPlan::build(&DeviceConfig::default(), &synthesis).unwrap()
    }

    fn render(plan: &SynthesisPlan) -> std::string::String {
        let mut out = std::string::String::new();
        write_plan(&mut out, plan).unwrap();
        out
    }

    #[test]
    fn test_step_table_rows() {
        let out = render(&plan("GAP"));
        let rows: std::vec::Vec<&str> = out
            .lines()
            .filter(|l| l.ends_with("fmoc") || l.ends_with("none"))
            .collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("1     P       10    single"));
        assert!(rows[1].starts_with("2     A       9     double"));
        assert!(rows[2].starts_with("3     G       8     single"));
    }

    #[test]
    fn test_reagent_table_row() {
        let out = render(&plan("GAP"));
        let row = out.lines().find(|l| l.starts_with("P(1)")).unwrap();
        assert!(row.contains("10"));
        assert!(row.contains("0.8 ml"));
        assert!(row.contains("89 mg"));
        assert!(row.ends_with("713 ul"));
        assert!(out.lines().any(|l| l.starts_with("A(2)")));
    }

    #[test]
    fn test_bulk_and_estimate() {
        let out = render(&plan("GAP"));
        assert!(out.contains("Volume of DMF = 76.5 ml"));
        assert!(out.contains("Volume of DCM = 21.5 ml"));
        assert!(out.contains("Estimated run time: "));
        assert!(!out.contains("Part 1"));
    }

    #[test]
    fn test_split_plan_has_part_headers() {
        let out = render(&plan("WACDEFGHIKLMNPQRST"));
        assert!(out.contains("Part 1 of 2"));
        assert!(out.contains("Part 2 of 2"));
        assert!(out.lines().any(|l| l.starts_with("18    W       8")));
    }

    #[test]
    fn test_pause_row_uses_home_port() {
        let out = render(&plan("G*A"));
        assert!(out
            .lines()
            .any(|l| l.starts_with("2     *       1     pause       none")));
    }
}
