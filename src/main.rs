use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use uisync::codec::CodecRegistry;
use uisync::config::Config;
use uisync::gate::{ClientItem, ClientMessage};
use uisync::logging::init_tracing;
use uisync::property::PropertyEntry;
use uisync::style::load_style_sheet;
use uisync::tree::{self, ComponentNode, ComponentRegistry, TreeDecoder};
use uisync::wire::Element;

#[derive(Parser)]
#[command(name = "uisync")]
#[command(about = "Inspect UI synchronization wire documents")]
struct Cli {
    /// Config file (default: ~/.config/uisync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Known component types, comma separated. Without it every type is
    /// accepted.
    #[arg(long, global = true, value_delimiter = ',')]
    types: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a component document and print the tree
    Decode {
        file: PathBuf,
    },
    /// Decode, encode again and print the result; fails if the second
    /// decode differs from the first
    Reencode {
        file: PathBuf,
    },
    /// Print the styles of a style-sheet document
    Stylesheet {
        file: PathBuf,
    },
    /// Summarize a client message
    Message {
        file: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    init_tracing(&config.logging);

    let registry = CodecRegistry::global();
    registry.seal();
    let mut components = ComponentRegistry::new().accept_unknown_types(
        cli.types.is_empty() || config.codec.accept_unknown_components,
    );
    for type_name in &cli.types {
        components.register_basic(type_name);
    }

    match cli.command {
        Commands::Decode { file } => {
            let root = decode_file(&file, &config, &components, registry)?;
            print_node(&root, 0);
        }
        Commands::Reencode { file } => {
            let first = decode_file(&file, &config, &components, registry)?;
            let xml = tree::encode(&first, registry)?.to_xml_string()?;
            let reparsed = Element::parse_with_max_depth(&xml, config.codec.max_depth)?;
            let second = decoder(&config, &components, registry).decode_component(&reparsed)?;
            if first != second {
                bail!("re-encoded document decodes to a different tree");
            }
            println!("{}", xml);
        }
        Commands::Stylesheet { file } => {
            let document = read_document(&file, &config)?;
            let sheet = load_style_sheet(&document, registry, None)?;
            for (key, bag) in sheet.iter() {
                match &key.component_type {
                    Some(component_type) => println!("{} ({})", key.name, component_type),
                    None => println!("{}", key.name),
                }
                for (name, entry) in bag.iter() {
                    println!("  {} = {}", name, describe(entry));
                }
            }
        }
        Commands::Message { file } => {
            let message = ClientMessage::from_element(&read_document(&file, &config)?)?;
            println!("transaction {}", message.transaction_id);
            for item in &message.items {
                match item {
                    ClientItem::Property { component, element } => {
                        let name = element.attr("n").or_else(|| element.attr("m")).unwrap_or("?");
                        println!("  {} property {}", component, name);
                    }
                    ClientItem::Event {
                        component,
                        event_type,
                    } => println!("  {} event {}", component, event_type),
                }
            }
        }
        Commands::Config => {
            println!("# {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn read_document(path: &Path, config: &Config) -> Result<Element> {
    let xml = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Element::parse_with_max_depth(&xml, config.codec.max_depth)
        .with_context(|| format!("parsing {}", path.display()))
}

fn decoder<'a>(
    config: &Config,
    components: &'a ComponentRegistry,
    registry: &'a CodecRegistry,
) -> TreeDecoder<'a> {
    TreeDecoder::new(components, registry)
        .with_missing_reference_policy(config.codec.missing_reference)
        .with_max_property_index(config.codec.max_property_index)
}

fn decode_file(
    path: &Path,
    config: &Config,
    components: &ComponentRegistry,
    registry: &CodecRegistry,
) -> Result<ComponentNode> {
    let document = read_document(path, config)?;
    let root = decoder(config, components, registry).decode_component(&document)?;
    Ok(root)
}

fn print_node(node: &ComponentNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut flags = Vec::new();
    if !node.enabled {
        flags.push("disabled".to_string());
    }
    if let Some(style) = &node.style_name {
        flags.push(format!("style={}", style));
    }
    if !node.events.is_empty() {
        let events: Vec<_> = node.events.iter().map(String::as_str).collect();
        flags.push(format!("events={}", events.join(",")));
    }
    println!("{}{} #{} {}", indent, node.kind, node.id, flags.join(" "));
    for (name, entry) in node.properties.iter() {
        println!("{}  .{} = {}", indent, name, describe(entry));
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn describe(entry: &PropertyEntry) -> String {
    match entry {
        PropertyEntry::Value(value) => format!("{:?}", value),
        PropertyEntry::Indexed(values) => format!("{:?}", values),
    }
}
