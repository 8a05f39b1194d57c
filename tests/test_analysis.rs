mod common;

use common::*;
use image::DynamicImage;

#[test]
fn all_black_is_zero_in_fixed_mode() -> anyhow::Result<()> {
    let analyzer = Analyzer::new(fixed_config(0.5))?;
    let analysis = analyzer.analyze_bytes(&solid_png(SIZE, SIZE, 0))?;
    assert_eq!(analysis.ratio, 0.0);
    assert_eq!(analysis.bright_pixels, 0);
    assert_eq!(analysis.bucket, AdviceBucket::Low);
    Ok(())
}

#[test]
fn all_white_scales_by_sensitivity_and_clamps() -> anyhow::Result<()> {
    for (sensitivity, expected) in [(0.5, 50.0), (1.0, 100.0), (3.0, 100.0), (0.1, 10.0)] {
        let analyzer = Analyzer::new(fixed_config(sensitivity))?;
        let analysis = analyzer.analyze_bytes(&solid_png(SIZE, SIZE, 255))?;
        assert_eq!(analysis.ratio, expected, "sensitivity {}", sensitivity);
    }
    Ok(())
}

#[test]
fn all_white_survives_default_preprocessing() -> anyhow::Result<()> {
    // Different size on input, so resize, smoothing and opening all run
    let mut config = PipelineConfig::default();
    config.threshold.mode = ThresholdMode::Fixed;
    let analyzer = Analyzer::new(config)?;
    let analysis = analyzer.analyze_bytes(&solid_png(120, 90, 255))?;
    assert_eq!(analysis.ratio, 50.0);
    assert_eq!(analysis.total_pixels, 600 * 600);
    assert_eq!(analysis.bucket, AdviceBucket::High);
    Ok(())
}

#[test]
fn ratio_stays_in_bounds() -> anyhow::Result<()> {
    let images = [
        solid_png(SIZE, SIZE, 0),
        solid_png(SIZE, SIZE, 255),
        encode_png(DynamicImage::ImageLuma8(lit_strands(30))),
    ];

    for sensitivity in [0.0, 0.5, 1.0, 5.0, 100.0] {
        for config in [fixed_config(sensitivity), {
            let mut c = adaptive_config();
            c.sensitivity = sensitivity;
            c
        }] {
            let analyzer = Analyzer::new(config)?;
            for bytes in &images {
                let ratio = analyzer.analyze_bytes(bytes)?.ratio;
                assert!((0.0..=100.0).contains(&ratio), "ratio {} out of range", ratio);
            }
        }
    }
    Ok(())
}

#[test]
fn identical_input_gives_identical_ratio() -> anyhow::Result<()> {
    let bytes = encode_png(DynamicImage::ImageLuma8(lit_strands(10)));
    let analyzer = Analyzer::new(PipelineConfig::default())?;
    let first = analyzer.analyze_bytes(&bytes)?;
    let second = analyzer.analyze_bytes(&bytes)?;
    assert_eq!(first, second);

    // A fresh analyzer with an equal config agrees too
    let third = Analyzer::new(PipelineConfig::default())?.analyze_bytes(&bytes)?;
    assert_eq!(first.ratio, third.ratio);
    Ok(())
}

#[test]
fn empty_input_is_reported() -> anyhow::Result<()> {
    let analyzer = Analyzer::new(PipelineConfig::default())?;
    assert!(matches!(analyzer.analyze_bytes(&[]), Err(AnalysisError::EmptyInput)));
    Ok(())
}

#[test]
fn text_bytes_are_a_decode_error_not_zero() -> anyhow::Result<()> {
    let analyzer = Analyzer::new(PipelineConfig::default())?;
    let result = analyzer.analyze_bytes(b"name,ratio\nalice,12.5\n");
    match result {
        Err(AnalysisError::Decode { attempts }) => assert!(!attempts.is_empty()),
        other => panic!("expected decode error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut config = PipelineConfig::default();
    config.threshold.block_size = 8;
    assert!(matches!(Analyzer::new(config), Err(AnalysisError::InvalidConfig(_))));
}

#[test]
fn huge_parameters_are_rejected_before_any_work() {
    let mut config = adaptive_config();
    config.threshold.block_size = 4_000_000_001;
    assert!(matches!(Analyzer::new(config), Err(AnalysisError::InvalidConfig(_))));

    let mut config = fixed_config(1.0);
    config.working_width = 100_000;
    assert!(matches!(Analyzer::new(config), Err(AnalysisError::InvalidConfig(_))));
}

#[test]
fn adaptive_is_steadier_than_fixed_under_lighting_shifts() -> anyhow::Result<()> {
    let shifted: Vec<Vec<u8>> = [0u8, 20, 40, 60, 80]
        .iter()
        .map(|&offset| encode_png(DynamicImage::ImageLuma8(lit_strands(offset))))
        .collect();

    let ratios = |analyzer: &Analyzer| -> anyhow::Result<Vec<f64>> {
        shifted
            .iter()
            .map(|bytes| Ok(analyzer.analyze_bytes(bytes)?.ratio))
            .collect()
    };

    let fixed = ratios(&Analyzer::new(fixed_config(1.0))?)?;
    let adaptive = ratios(&Analyzer::new(adaptive_config())?)?;

    assert!(
        variance(&adaptive) < variance(&fixed),
        "adaptive {:?} vs fixed {:?}",
        adaptive,
        fixed
    );
    Ok(())
}

#[test]
fn fixed_mode_counts_strands_once_bright_enough() -> anyhow::Result<()> {
    // Offset 80 puts strands at 150..=250; those with background >= 70 pass 200
    let bytes = encode_png(DynamicImage::ImageLuma8(lit_strands(80)));
    let analysis = Analyzer::new(fixed_config(1.0))?.analyze_bytes(&bytes)?;
    assert!(analysis.bright_pixels > 0);
    assert!(analysis.bright_pixels < analysis.total_pixels);
    Ok(())
}

#[test]
fn report_serialises_success_and_failure() -> anyhow::Result<()> {
    let analyzer = Analyzer::new(fixed_config(0.5))?;

    let ok = Report::from(analyzer.analyze_bytes(&solid_png(SIZE, SIZE, 255)));
    let json = serde_json::to_value(&ok)?;
    assert_eq!(json["ratio"], 50.0);
    assert_eq!(json["bucket"], "high");
    assert!(json["advice"].is_string());

    let failed = Report::from(analyzer.analyze_bytes(&[]));
    let json = serde_json::to_value(&failed)?;
    assert_eq!(json["kind"], "empty_input");
    assert!(json.get("ratio").is_none());
    Ok(())
}
