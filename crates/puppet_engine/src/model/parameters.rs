//! Parameter access for procedural cycles
//!
//! The rig's parameter core is external; cycles only need to look up a
//! parameter by id and write to it.

/// Writable view of a model's parameters
pub trait ParameterModel {
    /// Index of a parameter id, if the model has it
    fn parameter_index(&self, id: &str) -> Option<usize>;

    /// Current value of a parameter
    fn parameter_value(&self, index: usize) -> f32;

    /// Overwrite a parameter
    fn set_parameter(&mut self, index: usize, value: f32);

    /// Scale a parameter by `factor`
    fn multiply_parameter(&mut self, index: usize, factor: f32) {
        let value = self.parameter_value(index);
        self.set_parameter(index, value * factor);
    }
}

/// Plain named parameter storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    ids: Vec<String>,
    values: Vec<f32>,
    defaults: Vec<f32>,
}

impl ParameterTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with its default value and return its index
    pub fn add(&mut self, id: impl Into<String>, default: f32) -> usize {
        self.ids.push(id.into());
        self.values.push(default);
        self.defaults.push(default);
        self.ids.len() - 1
    }

    /// Builder pattern: add a parameter
    pub fn with(mut self, id: impl Into<String>, default: f32) -> Self {
        self.add(id, default);
        self
    }

    /// Restore every parameter to its default, as done at the start of each model update
    pub fn reset(&mut self) {
        self.values.copy_from_slice(&self.defaults);
    }

    /// Value by id
    pub fn get(&self, id: &str) -> Option<f32> {
        self.parameter_index(id).map(|index| self.values[index])
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl ParameterModel for ParameterTable {
    fn parameter_index(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|existing| existing == id)
    }

    fn parameter_value(&self, index: usize) -> f32 {
        self.values[index]
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        self.values[index] = value;
    }
}
