// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Decodes AIXM messages into a feature graph and prints it as JSON.
//!
//! Run with: `cargo run --bin aixm-graph --features cli -- data.xml`

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use aixm_graph::{Decoder, Schema, ToJson};

#[derive(Parser)]
#[command(version, about = "Decode AIXM messages into a cross-referenced feature graph")]
struct Args {
    /// Feature schema as a YAML table; defaults to the built-in AIXM 5.1
    /// schema
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Replace resolved references with the features they point to
    #[arg(long)]
    resolve: bool,

    /// AIXM message documents to decode
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let schema = match &args.schema {
        Some(path) => {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("{}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            };
            match Schema::from_yaml(&text) {
                Ok(schema) => schema,
                Err(e) => {
                    eprintln!("{}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            }
        }
        None => Schema::aixm(),
    };

    let mut data = Vec::new();
    for path in &args.inputs {
        match fs::read(path) {
            Ok(bytes) => data.push(bytes),
            Err(e) => eprintln!("{}: {e}", path.display()),
        }
    }
    if data.is_empty() {
        return ExitCode::FAILURE;
    }

    let inputs: Vec<&[u8]> = data.iter().map(Vec::as_slice).collect();
    let mut graph = Decoder::new(&schema).decode(&inputs);
    if args.resolve {
        graph.substitute_links();
    }

    for error in graph.errors() {
        eprintln!("warning: {error}");
    }

    let json = serde_json::to_string_pretty(&graph.to_json()).expect("JSON rendering");
    println!("{json}");

    ExitCode::SUCCESS
}
