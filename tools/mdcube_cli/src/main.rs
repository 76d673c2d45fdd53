use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use mdcube::{parser, Dataset, SqliteSource};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "mdcube")]
#[command(about = "Resolve a YAML-defined dataset against a SQLite database")]
#[command(version)]
struct Args {
    /// SQLite database file
    #[arg(long)]
    database: PathBuf,

    /// Dataset definition (YAML)
    #[arg(long)]
    definition: PathBuf,

    /// Table or parenthesized subquery to query; overrides the definition's `source`
    #[arg(long)]
    table: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Show dimension labels instead of raw values (table format)
    #[arg(long)]
    labels: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let definition = parser::parse_file(&args.definition)
        .with_context(|| format!("loading {}", args.definition.display()))?;

    let relation = match args.table.or_else(|| definition.source.clone()) {
        Some(relation) => relation,
        None => bail!("no --table given and the definition has no source"),
    };

    let conn = Connection::open_with_flags(&args.database, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("opening {}", args.database.display()))?;
    let source = SqliteSource::new(Rc::new(conn), relation);

    let model = definition.into_model(source)?;
    let dataset = model.resolve_dataset()?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&dataset)?),
        Format::Table => print!("{}", render_table(&dataset, args.labels)),
    }
    Ok(())
}

/// Tab-separated rows: dimension columns first, then measures
fn render_table(dataset: &Dataset, labels: bool) -> String {
    let mut header: Vec<&str> = dataset.dimension_keys().collect();
    header.extend(dataset.measure_keys());

    let mut out = header.join("\t");
    out.push('\n');

    for point in dataset.data() {
        let mut cells = Vec::with_capacity(header.len());
        for dimension in dataset.dimensions() {
            let cell = match point.get(dimension.key()) {
                Some(value) if labels => dimension
                    .label_for(value)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string()),
                Some(value) => value.to_string(),
                None => String::new(),
            };
            cells.push(cell);
        }
        for measure in dataset.measure_keys() {
            cells.push(point.get(measure).map(|v| v.to_string()).unwrap_or_default());
        }
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}
