// Copyright 2025 Chisomo Makombo Sakala
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

//! # Devrun
//!
//! `devrun` is an extensible engine for running declarative commands. Each
//! command has a name and an input, for example `{cl: "make check"}`. The
//! name is matched against an ordered registry of pluggable runners, and the
//! first runner that matches executes it. Runners can spawn shell commands,
//! render templates, prompt the user, emit log records, or run other
//! command lists.
//!
//! This crate contains the library behind the `devrun` CLI. Its core
//! modules (`shell`, `runners`, `runtime`) can be used on their own.
//!
//! ## Core Modules
//!
//! * [`shell`]: The process execution engine. Spawns one shell command, streams
//!   its merged stdout/stderr and returns the output or an `ExecutionFailure`.
//! * [`processors`]: Named rewrites applied to every shell command before it is spawned.
//! * [`command`]: The `Command` entity and `RunnerResult`.
//! * [`runners`]: The `CommandRunner` trait, the ordered registry and the
//!   built-in runners (`ask_*`, `call`/`use`, `cl`/`cl_[is]`, `dependencies`,
//!   `jinja_render`, `log_*`, `scl ...`).
//! * [`runtime`]: Owns the registries and collaborators and performs dispatch.
//! * [`section`]: Runs a list of commands, formatting each input first.
//! * [`vars`]: `$name` / `${name}` substitution.
//! * [`library`]: Assistants and snippets that `call` resolves against.
//! * [`dialog`]: Interactive prompts.
//! * [`template`]: Template lookup and rendering.
//! * [`config`]: Layered `figment` settings and section file loading.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod cli;
pub mod command;
pub mod config;
pub mod dialog;
pub mod error;
pub mod library;
pub mod logging;
pub mod processors;
pub mod runners;
pub mod runtime;
pub mod section;
pub mod shell;
pub mod template;
pub mod vars;
