use std::fmt::Write;

use visotraf_core::{Phase, PhasePosition, SchedulePlan, SignalGroup, SignalState};

fn lamp(state: SignalState) -> char {
    match state {
        SignalState::Green => 'G',
        SignalState::Yellow => 'Y',
        SignalState::Red => 'R',
    }
}

fn lamps(phase: &Phase) -> String {
    SignalGroup::ALL.iter().map(|g| lamp(phase.states.get(*g))).collect()
}

/// Human-readable plan: allocation header followed by one line per phase.
pub fn plan_text(plan: &SchedulePlan) -> String {
    let a = &plan.allocation;
    let c = &plan.counts;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "counts N={} S={} E={} W={}{}",
        c.north,
        c.south,
        c.east,
        c.west,
        if plan.accepted { "" } else { " (debounced)" }
    );
    let _ = writeln!(
        out,
        "green  main NS {:.1}s  EO {:.1}s | turn NS {:.1}s  EO {:.1}s",
        a.main_ns_s, a.main_eo_s, a.turn_ns_s, a.turn_eo_s
    );
    let _ = writeln!(out, "  #  {:<18} {:>7}  {}  {}", "phase", "secs", "ns/nt/eo/et", "description");
    for (i, p) in plan.cycle.phases().iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}  {:<18} {:>7.1}  {}         {}",
            i + 1,
            p.name(),
            p.duration_s,
            lamps(p),
            p.description
        );
    }
    let _ = write!(out, "cycle {:.1}s", plan.cycle.total_duration_s());
    out
}

pub fn position_text(pos: &PhasePosition) -> String {
    format!(
        "phase {} {} [{}] {:.0}s left",
        pos.index + 1,
        pos.phase.name(),
        lamps(&pos.phase),
        pos.remaining_s.ceil()
    )
}
