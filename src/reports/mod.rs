use cellforge::optimizer::{SearchOutcome, Termination};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::time::Duration;

pub fn print_elapsed(elapsed: Duration) {
    println!("Elapsed time: {:.2} seconds", elapsed.as_secs_f64());
}

pub fn print_summary(outcome: &SearchOutcome) {
    let best = &outcome.best;
    let stats = &outcome.stats;

    println!("\n=== 🏆 FINAL RESULT ===");
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let (cost_text, cost_color) = if best.is_found() {
        (format!("{}", best.cost), Color::Green)
    } else {
        ("inf (no iteration scored)".to_string(), Color::Red)
    };

    let termination_color = match outcome.termination {
        Termination::Exhausted => Color::Green,
        Termination::DeadlineExpired => Color::Yellow,
        Termination::Cancelled | Termination::Interrupted => Color::Red,
    };

    table.add_row(vec![
        Cell::new("Best cost").add_attribute(Attribute::Bold),
        Cell::new(cost_text).fg(cost_color),
    ]);
    table.add_row(vec![
        Cell::new("Best netlist").add_attribute(Attribute::Bold),
        Cell::new(best.netlist.display()),
    ]);
    table.add_row(vec![
        Cell::new("Best genlib").add_attribute(Attribute::Bold),
        Cell::new(best.library.display()),
    ]);
    table.add_row(vec![
        Cell::new("Stopped").add_attribute(Attribute::Bold),
        Cell::new(outcome.termination).fg(termination_color),
    ]);
    table.add_row(vec![
        Cell::new("Iterations"),
        Cell::new(format!(
            "{} attempted / {} scored / {} improved",
            stats.attempted, stats.scored, stats.improvements
        )),
    ]);
    table.add_row(vec![
        Cell::new("Skipped"),
        Cell::new(format!(
            "generate {} | map {} | convert {} | evaluate {} | promote {}",
            stats.skipped_generate,
            stats.skipped_map,
            stats.skipped_convert,
            stats.skipped_evaluate,
            stats.skipped_promote
        )),
    ]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        Cell::new(format!("{:.2} s", outcome.elapsed.as_secs_f64()))
            .set_alignment(CellAlignment::Right),
    ]);
    println!("{}", table);

    print_elapsed(outcome.elapsed);
}
