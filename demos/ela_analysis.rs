//! Error Level Analysis Example
//!
//! Runs ELA at several recompression qualities, saves the difference and
//! highlight images, and prints the risk verdict for each pass.
//!
//! Run with: cargo run --example ela_analysis -- <image_path> [output_dir] [config.json]

use std::{env, fs, path::Path};

use ela_forensics::{
    ElaConfig, ForensicsAnalyzer, error::Result, report::ElaReport,
    report::visualization::Visualizer,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: {} <image_path> [output_dir] [config.json]", args[0]);
        return Ok(());
    }

    let image_path = &args[1];
    let output_dir = args.get(2).map(|s| s.as_str()).unwrap_or("./output");
    let base_config = match args.get(3) {
        Some(path) => ElaConfig::from_file(path)?,
        None => ElaConfig::default(),
    };

    fs::create_dir_all(output_dir)?;

    let visualizer = Visualizer::new();
    let loaded = ForensicsAnalyzer::new(image_path)?;

    for quality in [95, 90, 75] {
        println!("Analyzing at quality {}... ", quality);

        let config = ElaConfig {
            quality,
            ..base_config.clone()
        };
        let analyzer = loaded.clone().with_config(config);
        let assessment = analyzer.assess()?;
        let result = &assessment.result;

        let diff_output = Path::new(output_dir).join(format!("ela_q{}.png", quality));
        let highlight_output = Path::new(output_dir).join(format!("highlight_q{}.png", quality));
        let overlay_output = Path::new(output_dir).join(format!("overlay_q{}.png", quality));
        result.save_difference(&diff_output)?;
        result.save_highlight(&highlight_output)?;
        visualizer
            .visualize_ela(analyzer.image(), result)
            .save(&overlay_output)?;

        println!("  Std deviation: {:.2}", result.dispersion());
        println!("  Suspicious pixels: {}", result.anomaly_count());
        println!("  Regions: {}", result.regions().len());
        println!("  Verdict: {} ({})", assessment.risk, assessment.risk.description());
        println!("  Output: {}", diff_output.display());

        let report = ElaReport::from(&assessment);
        let json_output = Path::new(output_dir).join(format!("report_q{}.json", quality));
        fs::write(&json_output, report.to_json()?)?;
        println!();
    }

    Ok(())
}
