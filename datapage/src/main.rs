//! # datapage
//!
//! A CLI tool that turns a tabular dataset into a standalone HTML report.
//!
//! ## Overview
//!
//! datapage is built on top of datapagelib. It reads a dataset in the split
//! JSON layout (`{"columns": [...], "rows": [[...], ...]}`), optionally
//! projects it through column declarations, and publishes a single HTML page
//! that can hold further images and Vega-Lite charts.
//!
//! ## Usage
//!
//! ```bash
//! # Render a dataset as a page named after the file
//! datapage render sales.json
//!
//! # Use column declarations and a page title
//! datapage render sales.json --fields fields.json --title "Sales 2024"
//!
//! # Add an image and an interactive chart below the table
//! datapage render sales.json --image trend.png --chart share.vl.json
//!
//! # Show the projected table as JSON
//! datapage inspect sales.json --fields fields.json
//! ```

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::Style;
use datapagelib::{
    access_url, load_fields_file, CompositePage, Dataset, ElementOptions, HtmlTableOptions,
    ImageFormat, ResourceMode, TableField, TableFieldArray, VegaLiteChart,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("datapage")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Turn tabular data and charts into a single static HTML report")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Log more (repeat for debug output)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .help("Disable logging"),
        )
        .subcommand(
            Command::new("render")
                .about("Publish a dataset as an HTML page")
                .arg(
                    Arg::new("data")
                        .required(true)
                        .help("Dataset JSON file ({\"columns\": [...], \"rows\": [...]})"),
                )
                .arg(
                    Arg::new("fields")
                        .short('f')
                        .long("fields")
                        .help("Column declarations (JSON array)"),
                )
                .arg(Arg::new("title").short('t').long("title").help("Page title"))
                .arg(Arg::new("caption").long("caption").help("Page description"))
                .arg(
                    Arg::new("table-title")
                        .long("table-title")
                        .help("Heading above the table"),
                )
                .arg(
                    Arg::new("table-caption")
                        .long("table-caption")
                        .help("Description below the table heading"),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Output file name (defaults to the title, then the data file name)"),
                )
                .arg(
                    Arg::new("dir")
                        .short('d')
                        .long("dir")
                        .default_value(".")
                        .help("Output directory"),
                )
                .arg(
                    Arg::new("overwrite")
                        .long("overwrite")
                        .action(ArgAction::SetTrue)
                        .help("Replace an existing output file"),
                )
                .arg(
                    Arg::new("no-int-convert")
                        .long("no-int-convert")
                        .action(ArgAction::SetTrue)
                        .help("Keep whole-number float columns as floats"),
                )
                .arg(
                    Arg::new("scientific")
                        .long("scientific")
                        .action(ArgAction::SetTrue)
                        .help("Show floats exactly as stored"),
                )
                .arg(
                    Arg::new("image")
                        .short('i')
                        .long("image")
                        .action(ArgAction::Append)
                        .help("Image file to embed (png, jpg, gif, svg; repeatable)"),
                )
                .arg(
                    Arg::new("chart")
                        .short('c')
                        .long("chart")
                        .action(ArgAction::Append)
                        .help("Vega-Lite spec file to embed (repeatable)"),
                )
                .arg(
                    Arg::new("resources")
                        .long("resources")
                        .value_parser(["cdn", "inline"])
                        .default_value("cdn")
                        .help("Where chart scripts are loaded from"),
                )
                .arg(
                    Arg::new("vega-bundle")
                        .long("vega-bundle")
                        .help("JavaScript bundle of vega, vega-lite and vega-embed for inline resources"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the projected table as JSON")
                .arg(Arg::new("data").required(true).help("Dataset JSON file"))
                .arg(
                    Arg::new("fields")
                        .short('f')
                        .long("fields")
                        .help("Column declarations (JSON array)"),
                )
                .arg(
                    Arg::new("pretty-data")
                        .long("pretty-data")
                        .action(ArgAction::SetTrue)
                        .help("Print the dataset relabelled with headers instead"),
                ),
        )
}

/// Map -v/-q to a log level and install the terminal logger
fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("quiet") {
        LevelFilter::Off
    } else {
        match matches.get_count("verbose") {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    };
    // A logger may already be installed when embedded; keep it
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("missing argument '{}'", id))
}

fn file_stem(path: &str) -> Option<&str> {
    Path::new(path).file_stem().and_then(|s| s.to_str())
}

/// Descriptors from the fields file, or one per dataset column
fn load_table(matches: &ArgMatches, data: Dataset) -> anyhow::Result<TableFieldArray> {
    let fields = match matches.get_one::<String>("fields") {
        Some(path) => load_fields_file(path)?,
        None => data
            .columns()
            .iter()
            .map(|column| TableField::new(column.as_str()))
            .collect::<datapagelib::Result<Vec<_>>>()?,
    };
    Ok(TableFieldArray::new(fields, Some(data))?)
}

/// An element given after the table
#[derive(Debug, PartialEq, Eq)]
enum Extra<'a> {
    Image(&'a str),
    Chart(&'a str),
}

/// Values of a repeatable option paired with their argument positions
fn indexed<'a>(matches: &'a ArgMatches, id: &str) -> Vec<(usize, &'a str)> {
    match (matches.indices_of(id), matches.get_many::<String>(id)) {
        (Some(indices), Some(values)) => indices.zip(values.map(|s| s.as_str())).collect(),
        _ => Vec::new(),
    }
}

/// Images and charts in command-line order
fn extra_elements(matches: &ArgMatches) -> Vec<Extra<'_>> {
    let mut extras: Vec<(usize, Extra<'_>)> = indexed(matches, "image")
        .into_iter()
        .map(|(i, path)| (i, Extra::Image(path)))
        .chain(
            indexed(matches, "chart")
                .into_iter()
                .map(|(i, path)| (i, Extra::Chart(path))),
        )
        .collect();
    extras.sort_by_key(|(i, _)| *i);
    extras.into_iter().map(|(_, extra)| extra).collect()
}

fn add_image_file(page: &mut CompositePage, image: &str) -> anyhow::Result<()> {
    let format = Path::new(image)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| anyhow!("unsupported image type: {}", image))?;
    let bytes = fs::read(image).with_context(|| format!("failed to read image '{}'", image))?;
    let mut options = ElementOptions::new();
    if let Some(stem) = file_stem(image) {
        options = options.title(stem);
    }
    page.add_image(&bytes, format, options)?;
    Ok(())
}

fn add_chart_file(
    page: &mut CompositePage,
    chart: &str,
    bundle: Option<&str>,
) -> anyhow::Result<()> {
    let content =
        fs::read_to_string(chart).with_context(|| format!("failed to read chart '{}'", chart))?;
    let spec: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid chart spec '{}'", chart))?;
    let mut vega = VegaLiteChart::new(spec);
    if let Some(bundle) = bundle {
        vega = vega.with_inline_bundle(bundle);
    }
    page.add_chart(vega, ElementOptions::new())?;
    Ok(())
}

/// Handler for the render command
fn render_handler(matches: &ArgMatches) -> anyhow::Result<()> {
    let data_path = required(matches, "data")?;
    let data = Dataset::from_json_file(data_path)?;

    let resources: ResourceMode = required(matches, "resources")?
        .parse()
        .map_err(anyhow::Error::msg)?;
    let mut page = CompositePage::new().resource_mode(resources);
    if let Some(title) = matches.get_one::<String>("title") {
        page = page.title(title);
    }
    if let Some(caption) = matches.get_one::<String>("caption") {
        page = page.caption(caption);
    }

    let mut element = ElementOptions::new();
    if let Some(title) = matches.get_one::<String>("table-title") {
        element = element.title(title);
    }
    if let Some(caption) = matches.get_one::<String>("table-caption") {
        element = element.caption(caption);
    }

    if matches.get_one::<String>("fields").is_some() {
        let table = load_table(matches, data)?;
        page.add_table_from_fields(&table, element)?;
    } else {
        let options = HtmlTableOptions::new()
            .with_int_convert(!matches.get_flag("no-int-convert"))
            .with_non_scientific(!matches.get_flag("scientific"));
        page.add_table(&data, options, element)?;
    }

    let bundle = match matches.get_one::<String>("vega-bundle") {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read bundle '{}'", path))?,
        ),
        None => None,
    };
    for extra in extra_elements(matches) {
        match extra {
            Extra::Image(image) => add_image_file(&mut page, image)?,
            Extra::Chart(chart) => add_chart_file(&mut page, chart, bundle.as_deref())?,
        }
    }

    let name = matches
        .get_one::<String>("name")
        .map(|s| s.as_str())
        .or(page.get_title())
        .or(file_stem(data_path))
        .map(str::to_string);
    let path = page.publish_in(
        required(matches, "dir")?,
        name.as_deref(),
        matches.get_flag("overwrite"),
    )?;

    println!(
        "{} {}",
        Style::new().green().bold().apply_to("Published"),
        access_url(&path)
    );
    Ok(())
}

/// Handler for the inspect command
fn inspect_handler(matches: &ArgMatches) -> anyhow::Result<()> {
    let data = Dataset::from_json_file(required(matches, "data")?)?;
    let table = load_table(matches, data)?;

    let output = if matches.get_flag("pretty-data") {
        serde_json::to_string_pretty(table.df_pretty()?)?
    } else {
        serde_json::to_string_pretty(table.table_dict()?)?
    };
    println!("{}", output);
    Ok(())
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("render", sub)) => render_handler(sub),
        Some(("inspect", sub)) => inspect_handler(sub),
        Some((other, _)) => Err(anyhow!("unknown command '{}'", other)),
        None => Err(anyhow!("no command given")),
    }
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(&matches);

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
