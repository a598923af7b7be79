//! Expression list and slider reconciliation.

use crate::symbolic::symbolic_eval::extract_variables;
use std::collections::{HashMap, HashSet};

/// Cycled through in order as expressions are added.
pub const COLOR_PALETTE: [&str; 10] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#06b6d4", "#f97316", "#84cc16",
    "#ec4899", "#6366f1",
];

/// Names that never become sliders: plot variables, constants and
/// function names the variable extractor can let through.
const NON_SLIDER_NAMES: [&str; 11] = [
    "x", "y", "z", "e", "i", "sin", "cos", "tan", "log", "ln", "exp",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub id: u64,
    pub text: String,
    pub color: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub variable: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Slider {
    fn new(variable: &str) -> Self {
        Self {
            variable: variable.to_string(),
            value: 1.0,
            min: -10.0,
            max: 10.0,
            step: 0.1,
        }
    }
}

/// Owns the plotted expressions and their parameter sliders. Every
/// mutation of the expression list is followed by reconciliation, so the
/// slider set always matches the free variables of the visible
/// expressions.
#[derive(Debug, Default)]
pub struct GraphStore {
    expressions: Vec<Expression>,
    sliders: Vec<Slider>,
    next_id: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn slider(&self, variable: &str) -> Option<&Slider> {
        self.sliders.iter().find(|s| s.variable == variable)
    }

    /// Appends a visible expression, assigning the next palette color,
    /// and reconciles sliders. Returns the added and removed slider names.
    pub fn add_expression(&mut self, text: &str) -> (Vec<String>, Vec<String>) {
        let id = self.next_id;
        self.next_id += 1;
        let color = COLOR_PALETTE[self.expressions.len() % COLOR_PALETTE.len()];
        self.expressions.push(Expression {
            id,
            text: text.trim().to_string(),
            color: color.to_string(),
            visible: true,
        });
        log::debug!("added expression {id}: {text}");
        self.reconcile_sliders()
    }

    /// Replaces the text of an expression. Unknown ids are ignored.
    pub fn update_expression(&mut self, id: u64, text: &str) -> (Vec<String>, Vec<String>) {
        if let Some(expr) = self.expressions.iter_mut().find(|e| e.id == id) {
            expr.text = text.trim().to_string();
        }
        self.reconcile_sliders()
    }

    pub fn set_visible(&mut self, id: u64, visible: bool) -> (Vec<String>, Vec<String>) {
        if let Some(expr) = self.expressions.iter_mut().find(|e| e.id == id) {
            expr.visible = visible;
        }
        self.reconcile_sliders()
    }

    pub fn delete_expression(&mut self, id: u64) -> (Vec<String>, Vec<String>) {
        self.expressions.retain(|e| e.id != id);
        self.reconcile_sliders()
    }

    pub fn clear_all(&mut self) {
        self.expressions.clear();
        self.sliders.clear();
    }

    /// Sets a slider's value, clamped to its bounds. No-op for unknown
    /// sliders.
    pub fn update_slider(&mut self, variable: &str, value: f64) {
        if let Some(slider) = self.sliders.iter_mut().find(|s| s.variable == variable) {
            slider.value = value.clamp(slider.min, slider.max);
        }
    }

    pub fn set_slider_bounds(&mut self, variable: &str, min: f64, max: f64, step: f64) {
        if let Some(slider) = self.sliders.iter_mut().find(|s| s.variable == variable) {
            slider.min = min;
            slider.max = max;
            slider.step = step;
            slider.value = slider.value.clamp(min, max);
        }
    }

    /// Snapshot of slider values, keyed by variable name. This is the
    /// scope handed to the samplers.
    pub fn scope(&self) -> HashMap<String, f64> {
        self.sliders
            .iter()
            .map(|s| (s.variable.clone(), s.value))
            .collect()
    }

    /// Brings the slider list in line with the free variables of the
    /// visible expressions. Existing sliders keep their value and bounds.
    fn reconcile_sliders(&mut self) -> (Vec<String>, Vec<String>) {
        let wanted: HashSet<String> = self
            .expressions
            .iter()
            .filter(|e| e.visible)
            .flat_map(|e| extract_variables(&e.text))
            .filter(|v| !NON_SLIDER_NAMES.contains(&v.as_str()))
            .collect();

        let mut removed: Vec<String> = self
            .sliders
            .iter()
            .filter(|s| !wanted.contains(&s.variable))
            .map(|s| s.variable.clone())
            .collect();
        self.sliders.retain(|s| wanted.contains(&s.variable));

        let mut added: Vec<String> = wanted
            .iter()
            .filter(|v| self.slider(v).is_none())
            .cloned()
            .collect();
        added.sort();
        removed.sort();
        for variable in &added {
            self.sliders.push(Slider::new(variable));
        }
        if !added.is_empty() || !removed.is_empty() {
            log::debug!("sliders reconciled: added {added:?}, removed {removed:?}");
        }
        (added, removed)
    }
}
