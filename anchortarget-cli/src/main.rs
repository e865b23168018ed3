use anchortarget::{
    AnchorTargetGenerator, AssignConfig, BaseAnchor, FeatureSize, GroundTruthBox, ImageInputs,
    Label, OrientedBox, SampledEllipseOverlap, TargetConfig, TargetReport, WeightConfig,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Anchor target generation for one image (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Seed for positive / negative subsampling.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for the pipeline stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
struct BaseAnchorJson {
    height: f64,
    width: f64,
    #[serde(default)]
    theta: f64,
    #[serde(default)]
    cx: f64,
    #[serde(default)]
    cy: f64,
}

impl From<&BaseAnchorJson> for BaseAnchor {
    fn from(value: &BaseAnchorJson) -> Self {
        BaseAnchor::new(value.height, value.width)
            .with_theta(value.theta)
            .centered_at(value.cx, value.cy)
    }
}

#[derive(Debug, Deserialize)]
struct GroundTruthJson {
    cx: f64,
    cy: f64,
    height: f64,
    width: f64,
    theta: f64,
    #[serde(default)]
    class_label: i32,
}

impl From<&GroundTruthJson> for GroundTruthBox {
    fn from(value: &GroundTruthJson) -> Self {
        GroundTruthBox::new(
            OrientedBox::new(value.cx, value.cy, value.height, value.width, value.theta),
            value.class_label,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AssignConfigJson {
    pos_overlap_thresh: f64,
    neg_overlap_thresh: f64,
    clobber_positives: bool,
    positive_angle_filter: f64,
    negative_angle_filter: f64,
    batch_size: usize,
    fg_fraction: f64,
}

impl Default for AssignConfigJson {
    fn default() -> Self {
        let cfg = AssignConfig::default();
        Self {
            pos_overlap_thresh: cfg.pos_overlap_thresh,
            neg_overlap_thresh: cfg.neg_overlap_thresh,
            clobber_positives: cfg.clobber_positives,
            positive_angle_filter: cfg.positive_angle_filter,
            negative_angle_filter: cfg.negative_angle_filter,
            batch_size: cfg.batch_size,
            fg_fraction: cfg.fg_fraction,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct WeightConfigJson {
    positive_weight: f64,
    inside_weights: [f64; 5],
}

impl Default for WeightConfigJson {
    fn default() -> Self {
        let cfg = WeightConfig::default();
        Self {
            positive_weight: cfg.positive_weight,
            inside_weights: cfg.inside_weights,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OracleConfigJson {
    resolution: usize,
}

impl Default for OracleConfigJson {
    fn default() -> Self {
        Self {
            resolution: SampledEllipseOverlap::default().resolution(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_width: f64,
    image_height: f64,
    feature_height: usize,
    feature_width: usize,
    feature_stride: usize,
    allowed_border_padding_frac: f64,
    base_anchors: Vec<BaseAnchorJson>,
    ground_truth: Vec<GroundTruthJson>,
    output_path: Option<String>,
    assign: AssignConfigJson,
    weights: WeightConfigJson,
    oracle: OracleConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = TargetConfig::default();
        Self {
            image_width: 0.0,
            image_height: 0.0,
            feature_height: 0,
            feature_width: 0,
            feature_stride: cfg.feature_stride,
            allowed_border_padding_frac: cfg.allowed_border_padding_frac,
            base_anchors: Vec::new(),
            ground_truth: Vec::new(),
            output_path: None,
            assign: AssignConfigJson::default(),
            weights: WeightConfigJson::default(),
            oracle: OracleConfigJson::default(),
        }
    }
}

impl Config {
    fn target_config(&self) -> TargetConfig {
        TargetConfig {
            assign: AssignConfig {
                pos_overlap_thresh: self.assign.pos_overlap_thresh,
                neg_overlap_thresh: self.assign.neg_overlap_thresh,
                clobber_positives: self.assign.clobber_positives,
                positive_angle_filter: self.assign.positive_angle_filter,
                negative_angle_filter: self.assign.negative_angle_filter,
                batch_size: self.assign.batch_size,
                fg_fraction: self.assign.fg_fraction,
            },
            weights: WeightConfig {
                positive_weight: self.weights.positive_weight,
                inside_weights: self.weights.inside_weights,
            },
            feature_stride: self.feature_stride,
            allowed_border_padding_frac: self.allowed_border_padding_frac,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportRecord {
    total_anchors: usize,
    inside_anchors: usize,
    positives: usize,
    negatives: usize,
    ignored: usize,
}

impl From<TargetReport> for ReportRecord {
    fn from(value: TargetReport) -> Self {
        Self {
            total_anchors: value.total_anchors,
            inside_anchors: value.inside_anchors,
            positives: value.positives,
            negatives: value.negatives,
            ignored: value.ignored,
        }
    }
}

#[derive(Debug, Serialize)]
struct PositiveRecord {
    row: usize,
    col: usize,
    base: usize,
    anchor: [f64; 5],
    gt_index: usize,
    overlap: f64,
    target: [f64; 5],
}

#[derive(Debug, Serialize)]
struct Output {
    report: ReportRecord,
    label_shape: [usize; 4],
    target_shape: [usize; 4],
    positives: Vec<PositiveRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("anchortarget=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.feature_height == 0 || config.feature_width == 0 {
        return Err("feature_height and feature_width must be set in the config".into());
    }

    let base: Vec<BaseAnchor> = config.base_anchors.iter().map(BaseAnchor::from).collect();
    let gt: Vec<GroundTruthBox> = config.ground_truth.iter().map(GroundTruthBox::from).collect();
    let generator = AnchorTargetGenerator::new(&base, config.target_config())?;
    let oracle = SampledEllipseOverlap::new(config.oracle.resolution)?;

    let size = FeatureSize::new(config.feature_height, config.feature_width);
    let inputs = ImageInputs {
        gt: &gt,
        image_width: config.image_width,
        image_height: config.image_height,
        feature_size: size,
    };
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let out = generator.compute_targets(&inputs, &oracle, &mut rng)?;
    tracing::info!(
        seed = cli.seed,
        positives = out.report.positives,
        negatives = out.report.negatives,
        "targets generated"
    );

    let grid = generator.anchor_grid(size);
    let mut positives = Vec::new();
    for (k, &flat) in out.inside.indices().iter().enumerate() {
        if out.assignment.labels[k] != Label::Positive {
            continue;
        }
        let idx = grid.grid_index(flat);
        let target = out
            .dense
            .target_at(idx.base, idx.row, idx.col)
            .ok_or("positive anchor outside the target blob")?;
        positives.push(PositiveRecord {
            row: idx.row,
            col: idx.col,
            base: idx.base,
            anchor: out.inside.anchors()[k].to_array(),
            gt_index: out.assignment.best_gt[k],
            overlap: out.assignment.max_overlap[k],
            target,
        });
    }

    let output = Output {
        report: out.report.into(),
        label_shape: out.dense.label_shape(),
        target_shape: out.dense.target_shape(),
        positives,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
