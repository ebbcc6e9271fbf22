//! Formatted error tables for the run log.
//!
//! Every line ends with a marker (`<-- Hybrid-MD` / `<-- Hybrid-MD-Cumul`) so
//! the tables can be grepped out of a log shared with the MD code.

use crate::domain::{Measure, Tolerances};
use crate::monitor::{CumulativeErrors, ErrorReport};

const MARK: &str = "<-- Hybrid-MD";
const MARK_CUMUL: &str = "<-- Hybrid-MD-Cumul";
const SEPARATOR: &str = " -------------+------------------+------------------+------------+-----+";

/// Table of the last step's errors against their tolerances.
pub fn format_error_table(
    md_iteration: Option<usize>,
    report: &ErrorReport,
    tolerances: &Tolerances,
    refitting: bool,
) -> String {
    let mut out = String::new();

    match md_iteration {
        Some(it) => out.push_str(&format!(
            "\n      Hybrid-MD: MD iteration{it:8}                                    {MARK}\n"
        )),
        None => out.push('\n'),
    }
    out.push_str(&format!("{SEPARATOR} {MARK}\n"));
    out.push_str(&format!(
        "    Parameter |      value       |     tolerance    |    units   | OK? | {MARK}\n"
    ));
    out.push_str(&format!("{SEPARATOR} {MARK}\n"));

    for measure in Measure::ALL {
        let value = report.last.get(measure);
        let tolerance = report.tolerance(tolerances, measure);
        out.push_str(&tolerance_line(measure, value, tolerance));
    }

    out.push_str(&format!("{SEPARATOR} {MARK}\n"));
    let refit = if refitting { "Refitting!" } else { "No Refit" };
    out.push_str(&format!("{refit:>72} {MARK}\n"));
    out
}

fn tolerance_line(measure: Measure, value: Option<f64>, tolerance: Option<f64>) -> String {
    let name = measure.label();
    let unit = measure.unit();
    let value_str = match value {
        Some(v) => format!("{v:16.8}"),
        None => format!("{:>16}", "-"),
    };
    match (value, tolerance) {
        (Some(v), Some(tol)) => {
            let ok = if v < tol { "Yes" } else { " No" };
            format!(" {name:>12} | {value_str} | {tol:16.8} | {unit:10} | {ok:3} | {MARK}\n")
        }
        _ => format!(" {name:>12} | {value_str} | {:>16} | {unit:10} |     | {MARK}\n", "Off"),
    }
}

/// Cumulative RMSE over all compared frames.
pub fn format_cumulative_table(cumulative: &CumulativeErrors) -> String {
    let mut out = String::new();
    out.push_str(&format!("{SEPARATOR} {MARK_CUMUL}\n"));
    out.push_str(&format!(
        "  Cumulative RMSE       value            count: {:>8}  |    units   | {MARK_CUMUL}\n",
        cumulative.count
    ));
    out.push_str(&format!("{SEPARATOR} {MARK_CUMUL}\n"));
    out.push_str(&cumulative_line("Energy", Some(cumulative.energy_rmse), "eV/atom"));
    out.push_str(&cumulative_line("Forces", Some(cumulative.force_rmse), "eV/Å"));
    out.push_str(&cumulative_line("Virial", cumulative.virial_rmse, "eV"));
    out.push_str(&format!("{SEPARATOR} {MARK_CUMUL}\n"));
    out
}

fn cumulative_line(name: &str, value: Option<f64>, unit: &str) -> String {
    let value_str = match value {
        Some(v) => format!("{v:30.8}"),
        None => format!("{:>30}", "-"),
    };
    format!(" {name:>12}{value_str}               | {unit:10} | {MARK_CUMUL}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::StepErrors;

    fn report() -> ErrorReport {
        ErrorReport {
            last: StepErrors {
                ediff: 0.002,
                fmax: 0.4,
                frmse: 0.1,
                vmax: None,
            },
            cumulative: CumulativeErrors {
                count: 3,
                energy_rmse: 0.001,
                force_rmse: 0.12,
                virial_rmse: None,
            },
        }
    }

    #[test]
    fn error_table_marks_every_line() {
        let tol = Tolerances {
            ediff: Some(0.01),
            fmax: Some(0.3),
            frmse: None,
            vmax: Some(1.0),
        };
        let table = format_error_table(Some(12), &report(), &tol, true);
        let lines: Vec<&str> = table.lines().filter(|l| !l.is_empty()).collect();
        assert!(lines.iter().all(|l| l.ends_with(MARK)), "{table}");
        assert!(lines[0].contains("MD iteration      12"));
        assert!(table.contains("Refitting!"));

        let ediff = lines.iter().find(|l| l.contains("|Ediff|")).unwrap();
        assert!(ediff.contains("| Yes |"), "{ediff}");
        let fmax = lines.iter().find(|l| l.contains("max |Fdiff|")).unwrap();
        assert!(fmax.contains("|  No |"), "{fmax}");
        let frmse = lines.iter().find(|l| l.contains("force RMSE")).unwrap();
        assert!(frmse.contains("Off"), "{frmse}");
        // No virials in the frames: the virial tolerance is switched off.
        let vmax = lines.iter().find(|l| l.contains("max |Vdiff|")).unwrap();
        assert!(vmax.contains("Off"), "{vmax}");
    }

    #[test]
    fn error_table_without_iteration_or_refit() {
        let table = format_error_table(None, &report(), &Tolerances::default(), false);
        assert!(table.starts_with('\n'));
        assert!(table.contains("No Refit"));
        assert!(!table.contains("MD iteration"));
    }

    #[test]
    fn cumulative_table_reports_count_and_rmse() {
        let table = format_cumulative_table(&report().cumulative);
        assert!(table.lines().all(|l| l.ends_with(MARK_CUMUL)), "{table}");
        assert!(table.contains("count:        3"));
        assert!(table.contains("0.12000000"));
        let virial = table.lines().find(|l| l.contains("Virial")).unwrap();
        assert!(virial.contains(" - "), "{virial}");
    }
}
