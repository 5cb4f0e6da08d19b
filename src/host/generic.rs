//! Built-in `generic` host
//!
//! A small in-memory design so the console can run without an embedding
//! place-and-route tool.

use std::sync::Arc;

use crate::host::{EnumNamespace, HostModule, HostObject};
use crate::repl::namespace::Value;

static PLACE_STRENGTH: &[(&str, i64)] = &[
    ("NONE", 0),
    ("WEAK", 1),
    ("STRONG", 2),
    ("PLACER", 3),
    ("FIXED", 4),
    ("LOCKED", 5),
    ("USER", 6),
];

static PORT_TYPE: &[(&str, i64)] = &[("IN", 0), ("OUT", 1), ("INOUT", 2)];

/// A placed (or unplaced) cell
#[derive(Debug, Clone)]
pub struct Cell {
    pub name: String,
    pub cell_type: String,
    pub bel: Option<String>,
}

/// A net and its driver
#[derive(Debug, Clone)]
pub struct Net {
    pub name: String,
    pub driver: Option<String>,
}

/// Design context exposed as `ctx`
#[derive(Debug, Clone)]
pub struct Design {
    arch: String,
    cells: Vec<Cell>,
    nets: Vec<Net>,
}

impl Design {
    pub fn new(arch: impl Into<String>) -> Self {
        Self {
            arch: arch.into(),
            cells: Vec::new(),
            nets: Vec::new(),
        }
    }

    /// A three-cell counter design used by the stand-alone host
    pub fn sample(arch: impl Into<String>) -> Self {
        let mut design = Self::new(arch);
        design.add_cell("clk_ibuf", "IBUF", Some("IOB_X0Y0"));
        design.add_cell("counter_reg", "DFF", Some("SLICE_X1Y1"));
        design.add_cell("led_obuf", "OBUF", None);
        design.add_net("clk", Some("clk_ibuf"));
        design.add_net("count", Some("counter_reg"));
        design.add_net("led", Some("led_obuf"));
        design
    }

    pub fn add_cell(
        &mut self,
        name: &str,
        cell_type: &str,
        bel: Option<&str>,
    ) {
        self.cells.push(Cell {
            name: name.to_string(),
            cell_type: cell_type.to_string(),
            bel: bel.map(str::to_string),
        });
    }

    pub fn add_net(
        &mut self,
        name: &str,
        driver: Option<&str>,
    ) {
        self.nets.push(Net {
            name: name.to_string(),
            driver: driver.map(str::to_string),
        });
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }
}

impl HostObject for Design {
    fn type_name(&self) -> &str {
        "Context"
    }

    fn repr(&self) -> String {
        format!(
            "<Context arch='{}' cells={} nets={}>",
            self.arch,
            self.cells.len(),
            self.nets.len()
        )
    }

    fn attr(
        &self,
        name: &str,
    ) -> Option<Value> {
        let names = |items: Vec<&String>| {
            Value::List(items.into_iter().map(|n| Value::Str(n.clone())).collect())
        };
        match name {
            "arch" => Some(Value::Str(self.arch.clone())),
            "cells" => Some(names(self.cells.iter().map(|c| &c.name).collect())),
            "nets" => Some(names(self.nets.iter().map(|n| &n.name).collect())),
            "placed" => Some(names(
                self.cells
                    .iter()
                    .filter(|c| c.bel.is_some())
                    .map(|c| &c.name)
                    .collect(),
            )),
            _ => None,
        }
    }

    fn attr_names(&self) -> Vec<String> {
        ["arch", "cells", "nets", "placed"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

/// Stand-alone host module
#[derive(Debug, Clone)]
pub struct GenericHost {
    name: String,
    arch: String,
    design: Arc<Design>,
}

impl GenericHost {
    pub fn new(
        name: &str,
        arch: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            arch: arch.to_string(),
            design: Arc::new(Design::sample(arch)),
        }
    }

    /// Replace the design handed out as the session context
    pub fn with_design(
        mut self,
        design: Design,
    ) -> Self {
        self.design = Arc::new(design);
        self
    }
}

impl HostModule for GenericHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        crate::VERSION
    }

    fn arch(&self) -> &str {
        &self.arch
    }

    fn exports(&self) -> Vec<(String, Value)> {
        vec![
            (
                "PlaceStrength".to_string(),
                Value::Object(Arc::new(EnumNamespace::new("PlaceStrength", PLACE_STRENGTH))),
            ),
            (
                "PortType".to_string(),
                Value::Object(Arc::new(EnumNamespace::new("PortType", PORT_TYPE))),
            ),
        ]
    }

    fn context(&self) -> Option<Arc<dyn HostObject>> {
        let ctx: Arc<dyn HostObject> = self.design.clone();
        Some(ctx)
    }
}
