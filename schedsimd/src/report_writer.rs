//! Report formatting
//!
//! Turns the engine's structured [`Report`] into the plain-text output
//! layout: one row per terminated process, the summary block, and the
//! per-processor statistics.

use sim_core::Report;

/// Formats a report as output text
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("TT PID AT CT DL IO_D WT RT TRT\n");
    for row in &report.rows {
        let dl = row.deadline.map(|d| d as i64).unwrap_or(-1);
        out.push_str(&format!(
            "{} {} {} {} {} {} {} {} {}\n",
            row.tt, row.pid, row.at, row.ct, dl, row.io_dur, row.waiting, row.response, row.turnaround
        ));
    }

    out.push_str("\n--- Summary ---\n");
    let summary = &report.summary;
    out.push_str(&format!("Total Processes: {}\n", summary.total_terminated));
    out.push_str(&format!("Forked Created: {}\n", summary.forked_created));
    out.push_str(&format!("Killed (SIGKILL+ORPHAN): {}\n", summary.killed));
    out.push_str(&format!("Migration RTF (RR->SJF): {}\n", summary.mig_rtf));
    out.push_str(&format!("Migration MaxW (FCFS->RR): {}\n", summary.mig_maxw));
    out.push_str(&format!("Steal Moves: {}\n", summary.steal_moves));

    if summary.total_terminated > 0 {
        out.push_str(&format!("Avg WT: {}\n", summary.avg_waiting));
        out.push_str(&format!("Avg RT: {}\n", summary.avg_response));
        out.push_str(&format!("Avg TRT: {}\n", summary.avg_turnaround));
    }

    match &summary.deadline {
        Some(stat) => out.push_str(&format!(
            "Completed before deadline: {}% ({}/{})\n",
            stat.percent(),
            stat.met,
            stat.with_deadline
        )),
        None => out.push_str("Completed before deadline: N/A (no deadlines)\n"),
    }

    out.push_str("\n--- Processor Stats ---\n");
    for cpu in &report.cpus {
        out.push_str(&format!(
            "{} [{}] busy={} idle={} util%={}\n",
            cpu.id,
            cpu.kind,
            cpu.busy,
            cpu.idle,
            cpu.utilization()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::test_utils::{sched, spec, spec_dl, workload};

    #[test]
    fn test_format_basic_run() {
        let mut s = sched(
            workload(1, 0, 0, 0, vec![spec(1, 0, 3), spec(2, 1, 2)], vec![]),
            vec![],
        );
        s.run_to_completion();
        let text = format_report(&s.report());

        assert!(text.starts_with("TT PID AT CT DL IO_D WT RT TRT\n"));
        assert!(text.contains("3 1 0 3 -1 0 0 0 3\n"));
        assert!(text.contains("5 2 1 2 -1 0 2 2 4\n"));
        assert!(text.contains("Total Processes: 2"));
        assert!(text.contains("Avg WT: 1"));
        assert!(text.contains("Completed before deadline: N/A (no deadlines)"));
        assert!(text.contains("P0 [FCFS] busy=5 idle=0 util%=100"));
    }

    #[test]
    fn test_format_empty_run_omits_averages() {
        let mut s = sched(workload(1, 0, 0, 0, vec![], vec![]), vec![]);
        s.run_to_completion();
        let text = format_report(&s.report());

        assert!(text.contains("Total Processes: 0"));
        assert!(!text.contains("Avg WT"));
    }

    #[test]
    fn test_deadline_column_uses_minus_one() {
        let mut s = sched(
            workload(0, 0, 0, 1, vec![spec_dl(1, 0, 2, 9)], vec![]),
            vec![],
        );
        s.run_to_completion();
        let text = format_report(&s.report());

        // Deadline present: column carries it, not -1
        assert!(text.contains("2 1 0 2 9 0 0 0 2\n"));
        assert!(text.contains("Completed before deadline: 100% (1/1)"));
    }
}
