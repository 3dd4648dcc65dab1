// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

//! Finds mathematical notation embedded in generic code markup and replaces
//! it with typeset math, without being told which elements hold math and
//! which hold source code.
//!
//! The pipeline is a heuristic classifier over candidate `code` elements,
//! an annotator that delegates rendering to an external [`typeset::Typesetter`],
//! and an idempotent scheduler that tolerates content arriving after the
//! initial render. All bookkeeping lives as marker attributes in the
//! document tree itself.

pub mod annotate;
pub mod classify;
pub mod config;
pub mod dom;
pub mod markdown;
pub mod pipeline;
pub mod scan;
pub mod schedule;
pub mod typeset;

pub use classify::{Classifier, MathContext, Verdict};
pub use dom::{Document, NodeId};
pub use pipeline::Pipeline;
pub use typeset::{MathMlTypesetter, RenderOptions, Typesetter};
