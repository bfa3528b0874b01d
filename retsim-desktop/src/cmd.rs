use clap::{App, AppSettings, Arg, ArgMatches};
use glob::glob;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;

use retsim::*;

/// How the driver obtains the severity of each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeverityMode {
    Fixed(f32),
    Sweep { from: f32, to: f32, steps: usize },
}

#[derive(Debug)]
pub struct Config {
    pub diseases: Vec<Disease>,
    pub severity: SeverityMode,
    pub parameters: ValueMap,
    pub port: Option<u16>,
    pub scale: f32,
    pub frames: Option<usize>,
    pub asynchronous: bool,
    pub track_perf: bool,
    pub list: bool,
    pub verbosity: u64,
    pub output: Option<mustache::Template>,
    pub inputs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            diseases: vec![Disease::Glaucoma],
            severity: SeverityMode::Fixed(0.5),
            parameters: ValueMap::new(),
            port: None,
            scale: 1.0,
            frames: None,
            asynchronous: false,
            track_perf: false,
            list: false,
            verbosity: 0,
            output: None,
            inputs: Vec::new(),
        }
    }
}

pub const DEFAULT_OUTPUT: &str = "{{dirname}}/{{stem}}_{{disease}}_{{severity}}.{{extension}}";

fn from_json(arg: &str) -> Result<serde_json::Value, Box<dyn Error>> {
    if let Ok(json) = serde_json::from_str(arg) {
        Ok(json)
    } else {
        let mut data = String::new();
        let mut file = File::open(arg)?;
        file.read_to_string(&mut data)?;

        let json = serde_json::from_str(&data)?;
        Ok(json)
    }
}

fn from_json_obj(arg: &str) -> Result<ValueMap, Box<dyn Error>> {
    let json = from_json(arg)?;
    if !json.is_object() {
        return Err(format!("configuration must be a JSON object: {}", arg).into());
    }
    Ok(values_from_json(&json))
}

fn parse_number<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Box<dyn Error>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(text) => text
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| format!("invalid --{} '{}': {}", name, text, err).into()),
        None => Ok(None),
    }
}

pub fn app() -> App<'static, 'static> {
    App::new("Progressive Retinal Disease Simulator")
        .version(env!("CARGO_PKG_VERSION"))
        .author("The Visual System Simulator Developers")
        .about("Simulates progressive retinal diseases on images and videos")
        .arg(
            Arg::with_name("disease")
                .long("disease")
                .short("d")
                .value_name("NAME[,NAME..]")
                .number_of_values(1)
                .help("Sets the disease presets to apply, in order (see --list)"),
        )
        .arg(
            Arg::with_name("severity")
                .long("severity")
                .short("s")
                .value_name("SEVERITY")
                .number_of_values(1)
                .help("Sets a fixed severity in [0,1]"),
        )
        .arg(
            Arg::with_name("sweep")
                .long("sweep")
                .value_names(&["FROM", "TO", "STEPS"])
                .number_of_values(3)
                .conflicts_with("severity")
                .help("Sweeps the severity linearly over STEPS frames"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .value_name("FILE|JSON")
                .number_of_values(1)
                .help("Sets the disease parameters"),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .short("p")
                .value_name("PORT")
                .help("Listens for remote control connections on the given port"),
        )
        .arg(
            Arg::with_name("scale")
                .long("scale")
                .value_name("FACTOR")
                .number_of_values(1)
                .help("Computes masks at a reduced resolution, e.g. 0.5"),
        )
        .arg(
            Arg::with_name("frames")
                .long("frames")
                .short("n")
                .value_name("COUNT")
                .number_of_values(1)
                .help("Limits the number of frames processed per input"),
        )
        .arg(
            Arg::with_name("async")
                .long("async")
                .takes_value(false)
                .help("Composites frames on a background worker"),
        )
        .arg(
            Arg::with_name("perf")
                .long("perf")
                .takes_value(false)
                .help("Reports compositing times"),
        )
        .arg(
            Arg::with_name("list")
                .long("list")
                .short("l")
                .takes_value(false)
                .help("Lists diseases and their parameters"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .multiple(true)
                .takes_value(false)
                .help("Increases logging verbosity"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .value_name("MUSTACHE_PATTERN?")
                .min_values(0)
                .max_values(1)
                .help(
                    "Enables output with optional mustache-style pattern, e.g.:\n\
                    \x20\x20\"{{dirname}}/{{stem}}_{{disease}}_{{severity}}.{{extension}}\"  (default)\n\
                    \x20\x20\"{{dirname}}/out_{{tick}}_{{basename}}\"",
                ),
        )
        .arg(
            Arg::with_name("input")
                .value_name("INPUT|GLOB_PATTERN")
                .help(
                    "Input identifier or glob-style patterns, e.g.:\n\
                    \x20\x20image.png\n\
                    \x20\x20**/*.png video.mp4",
                )
                .required_unless("list")
                .multiple(true)
                .index(1),
        )
        .setting(AppSettings::ArgRequiredElseHelp)
        .setting(AppSettings::UnifiedHelpMessage)
}

pub fn cmd_parse() -> Result<Config, Box<dyn Error>> {
    config_from_matches(&app().get_matches())
}

pub fn config_from_matches(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let default = Config::default();

    let diseases = if let Some(names) = matches.value_of("disease") {
        names
            .split(',')
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.parse::<Disease>())
            .collect::<Result<Vec<_>, _>>()?
    } else {
        default.diseases
    };
    if diseases.is_empty() {
        return Err("no disease selected".into());
    }

    let severity = if let Some(sweep) = matches.values_of("sweep") {
        let sweep = sweep.collect::<Vec<&str>>();
        let from = sweep[0].trim().parse::<f32>()?;
        let to = sweep[1].trim().parse::<f32>()?;
        let steps = sweep[2].trim().parse::<usize>()?;
        SeverityMode::Sweep { from, to, steps }
    } else if let Some(value) = parse_number::<f32>(matches, "severity")? {
        SeverityMode::Fixed(value)
    } else {
        default.severity
    };

    let parameters = if let Some(config_str) = matches.value_of("config") {
        from_json_obj(config_str)?
    } else {
        default.parameters
    };

    let port = parse_number::<u16>(matches, "port")?.or(default.port);
    let scale = parse_number::<f32>(matches, "scale")?.unwrap_or(default.scale);
    let frames = parse_number::<usize>(matches, "frames")?.or(default.frames);

    let output = if matches.is_present("output") {
        let pattern = matches.value_of("output").unwrap_or(DEFAULT_OUTPUT);
        Some(mustache::compile_str(pattern)?)
    } else {
        default.output
    };

    let mut inputs = Vec::new();
    if let Some(patterns) = matches.values_of("input") {
        for pattern in patterns {
            match glob(pattern) {
                Ok(entries) => {
                    let before = inputs.len();
                    for entry in entries {
                        let path = entry?;
                        inputs.push(path.to_string_lossy().into_owned());
                    }
                    // not a file pattern, e.g. a missing file; reported when opened
                    if inputs.len() == before {
                        inputs.push(pattern.to_string());
                    }
                }
                Err(_) => inputs.push(pattern.to_string()),
            }
        }
    }

    Ok(Config {
        diseases,
        severity,
        parameters,
        port,
        scale,
        frames,
        asynchronous: matches.is_present("async"),
        track_perf: matches.is_present("perf"),
        list: matches.is_present("list"),
        verbosity: matches.occurrences_of("verbose"),
        output,
        inputs,
    })
}

/// Renders the recognized parameters of every disease.
pub fn parameter_listing() -> String {
    let mut text = String::new();
    for disease in Disease::ALL.iter() {
        text.push_str(&format!("{} ({})\n", disease.key(), disease.title()));
        for spec in disease.params() {
            text.push_str(&format!(
                "  {:<32} {:>8} in [{}, {}]  {}\n",
                spec.key, spec.default, spec.min, spec.max, spec.help
            ));
        }
    }
    text
}
