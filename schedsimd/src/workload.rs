//! # Workload File Parser
//!
//! Parses the line-based workload format into the structured record the
//! engine consumes.
//!
//! ## Format
//!
//! Lines may carry `//` comments; blank lines are skipped:
//!
//! ```text
//! // processors: NF NS NR NE
//! 1 1 1 1
//! // RR time slice
//! 2
//! // RTF MaxW STL forkProb
//! 3 5 4 20
//! // process count
//! 2
//! // AT PID CT [DL] IOcount (trigger,duration)...
//! 0 1 20 2 (4,3),(9,2)
//! 1 2 10 25 0
//! // kill events: time pid
//! 12 1
//! ```
//!
//! A process line with four integer fields before the I/O pairs has no
//! deadline; with five, the fourth is the absolute deadline. Arrival times
//! may carry a fractional part and are truncated to whole ticks.
//!
//! After parsing, processes are sorted by `(AT, PID)` and kill events by
//! `(time, pid)`; duplicate PIDs, I/O count mismatches, non-increasing or
//! out-of-range triggers, and out-of-range fork probabilities are rejected.

use core_types::{KillEvent, Pid};
use sim_core::config::{ProcessSpec, SimConfig, Workload};
use sim_core::process::IoRequest;
use std::collections::HashSet;
use thiserror::Error;

/// Workload load error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("Missing section: {0}")]
    MissingSection(&'static str),

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("I/O count mismatch for PID {pid}: declared {declared}, found {found}")]
    IoCountMismatch {
        pid: u32,
        declared: usize,
        found: usize,
    },

    #[error("Duplicate PID {0}")]
    DuplicatePid(u32),

    #[error("Invalid I/O triggers for PID {0}: triggers must be strictly increasing inside the CPU burst")]
    InvalidIoTriggers(u32),

    #[error("Fork probability {0} is outside 0..=100")]
    InvalidForkProb(u32),

    #[error("Workload declares processes but no processors")]
    NoProcessors,
}

/// Parses a workload from text
pub fn parse_workload(text: &str) -> Result<Workload, WorkloadError> {
    let lines: Vec<(usize, String)> = text
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                None
            } else {
                Some((idx + 1, line.to_string()))
            }
        })
        .collect();
    let mut cursor = 0usize;

    let (no, line) = take(&lines, &mut cursor, "processor counts")?;
    let counts = parse_fields::<usize>(no, line, 4, "processor count")?;
    let (nf, ns, nr, ne) = (counts[0], counts[1], counts[2], counts[3]);

    let (no, line) = take(&lines, &mut cursor, "RR time slice")?;
    let time_slice = parse_fields::<u32>(no, line, 1, "time slice")?[0];

    let (no, line) = take(&lines, &mut cursor, "RTF/MaxW/STL/forkProb")?;
    let knobs: Vec<&str> = line.split_whitespace().collect();
    if knobs.len() != 4 {
        return Err(WorkloadError::ParseError {
            line: no,
            message: format!("expected 4 policy knob field(s), found {}", knobs.len()),
        });
    }
    let rtf: u32 = parse_one(no, knobs[0], "RTF")?;
    let max_w: u32 = parse_one(no, knobs[1], "MaxW")?;
    let stl: u64 = parse_one(no, knobs[2], "STL")?;
    let fork_prob: u32 = parse_one(no, knobs[3], "fork probability")?;
    if fork_prob > 100 {
        return Err(WorkloadError::InvalidForkProb(fork_prob));
    }

    let (no, line) = take(&lines, &mut cursor, "process count")?;
    let process_count = parse_fields::<usize>(no, line, 1, "process count")?[0];

    let mut processes = Vec::with_capacity(process_count);
    let mut seen_pids = HashSet::new();
    for _ in 0..process_count {
        let (no, line) = take(&lines, &mut cursor, "process record")?;
        let spec = parse_process_line(no, line)?;
        if !seen_pids.insert(spec.pid) {
            return Err(WorkloadError::DuplicatePid(spec.pid.get()));
        }
        processes.push(spec);
    }

    let mut kill_events = Vec::new();
    while cursor < lines.len() {
        let (no, line) = take(&lines, &mut cursor, "kill event")?;
        let fields = parse_fields::<u64>(no, line, 2, "kill event field")?;
        kill_events.push(KillEvent {
            time: fields[0],
            pid: Pid::new(fields[1] as u32),
        });
    }

    let config = SimConfig {
        nf,
        ns,
        nr,
        ne,
        time_slice,
        rtf,
        max_w,
        stl,
        fork_prob,
        ..SimConfig::default()
    };
    if config.total_cpus() == 0 && !processes.is_empty() {
        return Err(WorkloadError::NoProcessors);
    }

    processes.sort_by_key(|spec| (spec.at, spec.pid));
    kill_events.sort();

    Ok(Workload {
        config,
        processes,
        kill_events,
    })
}

fn strip_comment(line: &str) -> &str {
    line.find("//").map(|pos| &line[..pos]).unwrap_or(line)
}

fn take<'a>(
    lines: &'a [(usize, String)],
    cursor: &mut usize,
    section: &'static str,
) -> Result<(usize, &'a str), WorkloadError> {
    match lines.get(*cursor) {
        Some((no, line)) => {
            *cursor += 1;
            Ok((*no, line.as_str()))
        }
        None => Err(WorkloadError::MissingSection(section)),
    }
}

fn parse_fields<T: std::str::FromStr>(
    no: usize,
    line: &str,
    expected: usize,
    what: &str,
) -> Result<Vec<T>, WorkloadError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(WorkloadError::ParseError {
            line: no,
            message: format!(
                "expected {} {} field(s), found {}",
                expected,
                what,
                tokens.len()
            ),
        });
    }
    tokens
        .iter()
        .map(|tok| {
            tok.parse::<T>().map_err(|_| WorkloadError::ParseError {
                line: no,
                message: format!("invalid {}: {}", what, tok),
            })
        })
        .collect()
}

fn parse_process_line(no: usize, line: &str) -> Result<ProcessSpec, WorkloadError> {
    let (head, rest) = match line.find('(') {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    };
    let fields: Vec<&str> = head.split_whitespace().collect();
    let (at_tok, pid_tok, ct_tok, dl_tok, cnt_tok) = match fields.len() {
        4 => (fields[0], fields[1], fields[2], None, fields[3]),
        5 => (fields[0], fields[1], fields[2], Some(fields[3]), fields[4]),
        n => {
            return Err(WorkloadError::ParseError {
                line: no,
                message: format!("expected 4 or 5 fields before I/O pairs, found {}", n),
            })
        }
    };

    // The simulation is timestep-based; fractional arrival times truncate
    let at_raw: f64 = at_tok.parse().map_err(|_| WorkloadError::ParseError {
        line: no,
        message: format!("invalid arrival time: {}", at_tok),
    })?;
    if !at_raw.is_finite() || at_raw < 0.0 {
        return Err(WorkloadError::ParseError {
            line: no,
            message: format!("invalid arrival time: {}", at_tok),
        });
    }
    let at = at_raw.trunc() as u64;

    let pid: u32 = parse_one(no, pid_tok, "PID")?;
    let ct: u32 = parse_one(no, ct_tok, "CPU need")?;
    let deadline = match dl_tok {
        Some(tok) => Some(parse_one::<u64>(no, tok, "deadline")?),
        None => None,
    };
    let declared: usize = parse_one(no, cnt_tok, "I/O count")?;

    let io = parse_io_pairs(no, rest)?;
    if io.len() != declared {
        return Err(WorkloadError::IoCountMismatch {
            pid,
            declared,
            found: io.len(),
        });
    }
    let mut last_trigger = 0u32;
    for req in &io {
        if req.trigger <= last_trigger || req.trigger >= ct {
            return Err(WorkloadError::InvalidIoTriggers(pid));
        }
        last_trigger = req.trigger;
    }

    Ok(ProcessSpec {
        pid: Pid::new(pid),
        at,
        ct,
        deadline,
        io,
    })
}

fn parse_one<T: std::str::FromStr>(no: usize, tok: &str, what: &str) -> Result<T, WorkloadError> {
    tok.parse::<T>().map_err(|_| WorkloadError::ParseError {
        line: no,
        message: format!("invalid {}: {}", what, tok),
    })
}

// Parses pairs like: (4,3),(9,2)
fn parse_io_pairs(no: usize, rest: &str) -> Result<Vec<IoRequest>, WorkloadError> {
    let mut pairs = Vec::new();
    let mut remainder = rest.trim();
    while let Some(start) = remainder.find('(') {
        let Some(len) = remainder[start..].find(')') else {
            return Err(WorkloadError::ParseError {
                line: no,
                message: "unterminated I/O pair".to_string(),
            });
        };
        let inner = &remainder[start + 1..start + len];
        let mut parts = inner.split(',').map(str::trim);
        let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(WorkloadError::ParseError {
                line: no,
                message: format!("malformed I/O pair ({})", inner),
            });
        };
        pairs.push(IoRequest {
            trigger: parse_one(no, a, "I/O trigger")?,
            duration: parse_one(no, b, "I/O duration")?,
        });
        remainder = &remainder[start + len + 1..];
    }
    Ok(pairs)
}
