//! The three SIR variants and the process-wide registry that maps a variant
//! name to its record.
//!
//! Each variant is a plain value carrying its equations as function pointers,
//! so dispatch is a table lookup rather than a trait object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::sir::{ModelParameters, ModelState, ParamName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    BasicSir,
    NaturalDemographics,
    DiseaseDeaths,
}

impl ModelKind {
    pub fn model(self) -> &'static Model {
        registry().by_kind(self)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model().name)
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        registry()
            .get(s)
            .map(|m| m.kind)
            .ok_or_else(|| unknown_model(s))
    }
}

/// Parameters resolved for one run. Terms a variant does not use are zero
/// (`n` is one), so the equations never branch on presence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub beta: f64,
    pub gamma: f64,
    pub mu: f64,
    pub alpha: f64,
    pub n: f64,
}

/// One model variant: its equations, threshold and required parameters.
pub struct Model {
    pub kind: ModelKind,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    required: &'static [ParamName],
    derivatives: fn(&ModelState, &Rates) -> ModelState,
    r0: fn(&Rates) -> f64,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn required_parameters(&self) -> &'static [ParamName] {
        self.required
    }

    pub fn requires(&self, name: ParamName) -> bool {
        self.required.contains(&name)
    }

    /// True for the variant whose state is expressed as population fractions.
    pub fn is_normalized(&self) -> bool {
        !self.requires(ParamName::N)
    }

    /// Every required parameter at its default value.
    pub fn default_parameters(&self) -> ModelParameters {
        let mut params = ModelParameters::default();
        for &name in self.required {
            params.set(name, name.default_value());
        }
        params
    }

    /// Checks every required parameter is present and fills the rest with
    /// neutral values.
    pub fn resolve(&self, params: &ModelParameters) -> Result<Rates, ModelError> {
        let take = |name: ParamName, neutral: f64| -> Result<f64, ModelError> {
            match params.get(name) {
                Some(v) if self.requires(name) => Ok(v),
                None if self.requires(name) => Err(ModelError::MissingParameter {
                    model: self.name,
                    parameter: name,
                }),
                _ => Ok(neutral),
            }
        };
        Ok(Rates {
            beta: take(ParamName::Beta, 0.0)?,
            gamma: take(ParamName::Gamma, 0.0)?,
            mu: take(ParamName::Mu, 0.0)?,
            alpha: take(ParamName::Alpha, 0.0)?,
            n: take(ParamName::N, 1.0)?,
        })
    }

    /// Instantaneous (dS/dt, dI/dt, dR/dt).
    pub fn compute_derivatives(
        &self,
        state: &ModelState,
        params: &ModelParameters,
    ) -> Result<ModelState, ModelError> {
        let rates = self.resolve(params)?;
        Ok(self.derivatives(state, &rates))
    }

    pub fn calculate_r0(&self, params: &ModelParameters) -> Result<f64, ModelError> {
        let rates = self.resolve(params)?;
        Ok(self.r0(&rates))
    }

    /// Derivatives against already-resolved rates; used inside the solver loop.
    pub fn derivatives(&self, state: &ModelState, rates: &Rates) -> ModelState {
        (self.derivatives)(state, rates)
    }

    pub fn r0(&self, rates: &Rates) -> f64 {
        (self.r0)(rates)
    }
}

/// β / removal rate, with a zero removal rate giving +∞ (or 0 when β is 0).
fn threshold(beta: f64, removal: f64) -> f64 {
    if removal == 0.0 {
        if beta > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        beta / removal
    }
}

fn basic_derivatives(y: &ModelState, p: &Rates) -> ModelState {
    let infection = p.beta * y.s * y.i;
    let recovery = p.gamma * y.i;
    ModelState::new(-infection, infection - recovery, recovery)
}

fn basic_r0(p: &Rates) -> f64 {
    threshold(p.beta, p.gamma)
}

// Births balance deaths of the living population, so S+I+R is conserved.
fn demographic_derivatives(y: &ModelState, p: &Rates) -> ModelState {
    let living = y.total();
    let infection = p.beta * y.s * y.i / p.n;
    let recovery = p.gamma * y.i;
    ModelState::new(
        p.mu * living - infection - p.mu * y.s,
        infection - recovery - p.mu * y.i,
        recovery - p.mu * y.r,
    )
}

fn demographic_r0(p: &Rates) -> f64 {
    threshold(p.beta, p.gamma + p.mu)
}

fn disease_death_derivatives(y: &ModelState, p: &Rates) -> ModelState {
    let mut rate = demographic_derivatives(y, p);
    rate.i -= p.alpha * y.i;
    rate
}

fn disease_death_r0(p: &Rates) -> f64 {
    threshold(p.beta, p.gamma + p.mu + p.alpha)
}

const BASIC_SIR: Model = Model {
    kind: ModelKind::BasicSir,
    name: "basic_sir",
    title: "Basic SIR",
    description: "Closed population with mass-action transmission; \
                  S, I and R are fractions of the whole.",
    required: &[ParamName::Beta, ParamName::Gamma],
    derivatives: basic_derivatives,
    r0: basic_r0,
};

const NATURAL_DEMOGRAPHICS: Model = Model {
    kind: ModelKind::NaturalDemographics,
    name: "natural_demographics",
    title: "SIR with births and deaths",
    description: "Births and natural deaths at rate μ keep the living population constant.",
    required: &[ParamName::Beta, ParamName::Gamma, ParamName::Mu, ParamName::N],
    derivatives: demographic_derivatives,
    r0: demographic_r0,
};

const DISEASE_DEATHS: Model = Model {
    kind: ModelKind::DiseaseDeaths,
    name: "disease_deaths",
    title: "SIR with disease mortality",
    description: "Vital dynamics plus disease-induced deaths at rate α among the infected.",
    required: &[
        ParamName::Beta,
        ParamName::Gamma,
        ParamName::Mu,
        ParamName::Alpha,
        ParamName::N,
    ],
    derivatives: disease_death_derivatives,
    r0: disease_death_r0,
};

/// Read-only table of every variant, built at compile time.
#[derive(Debug)]
pub struct ModelRegistry {
    models: [Model; 3],
}

static REGISTRY: ModelRegistry = ModelRegistry {
    models: [BASIC_SIR, NATURAL_DEMOGRAPHICS, DISEASE_DEATHS],
};

pub fn registry() -> &'static ModelRegistry {
    &REGISTRY
}

impl ModelRegistry {
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn by_kind(&self, kind: ModelKind) -> &Model {
        match kind {
            ModelKind::BasicSir => &self.models[0],
            ModelKind::NaturalDemographics => &self.models[1],
            ModelKind::DiseaseDeaths => &self.models[2],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.models.iter().map(|m| m.name)
    }
}

/// Error text for a name missing from the registry, listing the valid ones.
pub fn unknown_model(name: &str) -> String {
    let known: Vec<_> = registry().names().collect();
    format!("unknown model '{}', expected one of: {}", name, known.join(", "))
}
