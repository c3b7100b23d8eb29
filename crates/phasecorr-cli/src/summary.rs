use std::path::{Path, PathBuf};

use console::Style;
use phasecorr_core::{Registration, RegistrationConfig};

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_config_summary(
    reference: &Path,
    frame_count: usize,
    config: &RegistrationConfig,
    masked: bool,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Phase Correlation"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(17)));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Reference"),
        s.path.apply_to(reference.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(frame_count)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Precision"),
        s.value.apply_to(format!("1/{} px", config.upsample_factor))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Normalize"),
        s.value.apply_to(config.normalization)
    );
    if masked {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Masked"),
            s.value
                .apply_to(format!("overlap >= {:.0}%", config.overlap_ratio * 100.0))
        );
    } else if config.disambiguate {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Disambiguate"),
            s.value.apply_to("on")
        );
    }
    if !config.return_error.wants_metrics() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Metrics"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

pub fn print_results(paths: &[PathBuf], results: &[Registration]) {
    println!();
    println!(
        "{:<32}  {:>10}  {:>10}  {:>10}  {:>10}",
        "Image", "dy", "dx", "Error", "Phase"
    );
    println!("{}", "-".repeat(80));

    for (path, result) in paths.iter().zip(results) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let (error, phase) = match result.metrics {
            Some(m) => (format!("{:.6}", m.error), format!("{:.6}", m.phasediff)),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<32}  {:>10.4}  {:>10.4}  {:>10}  {:>10}",
            name, result.shift[0], result.shift[1], error, phase
        );
    }
}
