//! Nodle flow - command line driver for the scene core
//!
//! Builds the calculator example scene (or loads a `.flow` file), settles it,
//! prints the nodes in dependency order and optionally saves the result.
//!
//! ```text
//! nodle-flow [INPUT.flow] [--save OUTPUT]
//! ```

use clap::Parser;
use nodle_flow::editor::FileManager;
use nodle_flow::nodes::math::register_calculator_kinds;
use nodle_flow::nodes::{
    ModelState, NodeId, NodeRegistry, NodeValidationState, PortDirection, Scene, TypeConverterRegistry,
};
use nodle_flow::GraphResult;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nodle-flow")]
#[command(about = "Settle a node scene and print it in dependency order")]
struct Cli {
    /// Scene file to load instead of the built-in calculator
    input: Option<PathBuf>,

    /// Write the settled scene to this path (`.flow` is appended when missing)
    #[arg(long, value_name = "OUTPUT")]
    save: Option<PathBuf>,
}

/// Set the value of a number source the way an editor widget would
fn set_number(scene: &mut Scene, id: NodeId, number: serde_json::Value) -> GraphResult<()> {
    let mut state = ModelState::new();
    state.insert("number".to_string(), number);
    scene.update_model(id, |model, updates| {
        model.restore(&state).map(|()| updates.updated(0))
    })?
}

/// (12.5 / 2.5) → display, and 17 mod int(12.5 / 2.5) → display
fn build_calculator(scene: &mut Scene) -> GraphResult<()> {
    let dividend = scene.create_node("NumberSource")?;
    let divisor = scene.create_node("NumberSource")?;
    let division = scene.create_node("Division")?;
    let quotient = scene.create_node("NumberDisplay")?;
    let seventeen = scene.create_node("IntegerSource")?;
    let modulo = scene.create_node("Modulo")?;
    let remainder = scene.create_node("NumberDisplay")?;

    let layout = [
        (dividend, 0.0, 0.0),
        (divisor, 200.0, 0.0),
        (division, 100.0, 120.0),
        (quotient, 0.0, 240.0),
        (seventeen, 400.0, 120.0),
        (modulo, 300.0, 240.0),
        (remainder, 300.0, 360.0),
    ];
    for (id, x, y) in layout {
        scene.set_node_position(id, glam::Vec2::new(x, y))?;
    }

    scene.create_connection_by_index(division, 0, dividend, 0, None)?;
    scene.create_connection_by_index(division, 1, divisor, 0, None)?;
    scene.create_connection_by_index(quotient, 0, division, 0, None)?;
    // Decimal → Integer and Integer → Decimal through the registered converters
    scene.create_connection_by_index(modulo, 0, seventeen, 0, None)?;
    scene.create_connection_by_index(modulo, 1, division, 0, None)?;
    scene.create_connection_by_index(remainder, 0, modulo, 0, None)?;

    set_number(scene, dividend, json!(12.5))?;
    set_number(scene, divisor, json!(2.5))?;
    set_number(scene, seventeen, json!(17))?;
    Ok(())
}

fn print_scene(scene: &Scene) {
    println!("Dependency order:");
    for (position, id) in scene.dependency_order().into_iter().enumerate() {
        let Some(node) = scene.node(id) else { continue };
        let model = node.model();
        let state = match model.validation_state() {
            NodeValidationState::Valid => String::new(),
            _ => format!("  [{:?}: {}]", model.validation_state(), model.validation_message()),
        };
        let value = (0..node.outputs().len())
            .filter_map(|index| model.get_output(index))
            .map(|data| data.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:>3}. {:<14} {:<10}{}", position + 1, node.caption(), value, state);
    }
    println!("{} nodes, {} connections", scene.node_count(), scene.connection_count());

    // A display shows whatever its single input connection delivers
    let displays: Vec<String> = scene
        .iter_nodes()
        .filter(|node| node.kind_name() == "NumberDisplay")
        .map(|node| {
            node.connections(PortDirection::Input)
                .next()
                .and_then(|id| scene.connection(id))
                .and_then(|connection| connection.output())
                .and_then(|output| Some((scene.node(output.node)?, output.index)))
                .and_then(|(upstream, index)| upstream.model().get_output(index))
                .map(|data| data.to_string())
                .unwrap_or_else(|| "-".to_string())
        })
        .collect();
    println!("Displayed: {}", displays.join(", "));
}

fn run(args: Cli) -> GraphResult<()> {
    let mut registry = NodeRegistry::new();
    let mut converters = TypeConverterRegistry::new();
    register_calculator_kinds(&mut registry, &mut converters);

    let mut scene = Scene::new(registry, converters);
    let mut files = FileManager::new();
    files.track(&mut scene);

    match &args.input {
        Some(path) => {
            let metadata = files.load_from_file(path, &mut scene)?;
            log::info!("Scene created {} by {}", metadata.created, metadata.creator);
        }
        None => build_calculator(&mut scene)?,
    }
    scene.validate()?;
    print_scene(&scene);

    if let Some(path) = &args.save {
        let written = files.save_to_file(path, &scene)?;
        println!("Saved {}", written.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();

    if let Err(err) = run(args) {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
