//!
//! Disease presets: declarative [EffectDescriptors](EffectDescriptor) built from named
//! parameters.
//!
//! Every parameter key is prefixed with the disease key (`glaucoma_s1`, `cataract_blur`, …).
//! Missing keys fall back to their defaults and out-of-range values are clamped.
//!
mod amd_dry;
mod amd_wet;
mod cataract;
mod central_serous;
mod diabetic_retinopathy;
mod glaucoma;
mod myopia;
mod retinal_detachment;
mod retinitis_pigmentosa;
mod stargardt;

use std::fmt;
use std::str::FromStr;

use crate::*;

/// The diseases with a built-in preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disease {
    Glaucoma,
    DryMacularDegeneration,
    WetMacularDegeneration,
    Cataract,
    DiabeticRetinopathy,
    RetinitisPigmentosa,
    Stargardt,
    RetinalDetachment,
    CentralSerous,
    Myopia,
}

impl Disease {
    pub const ALL: [Disease; 10] = [
        Disease::Glaucoma,
        Disease::DryMacularDegeneration,
        Disease::WetMacularDegeneration,
        Disease::Cataract,
        Disease::DiabeticRetinopathy,
        Disease::RetinitisPigmentosa,
        Disease::Stargardt,
        Disease::RetinalDetachment,
        Disease::CentralSerous,
        Disease::Myopia,
    ];

    /// Identifier used on the command line and as parameter prefix.
    pub fn key(&self) -> &'static str {
        match self {
            Disease::Glaucoma => "glaucoma",
            Disease::DryMacularDegeneration => "amd_dry",
            Disease::WetMacularDegeneration => "amd_wet",
            Disease::Cataract => "cataract",
            Disease::DiabeticRetinopathy => "diabetic_retinopathy",
            Disease::RetinitisPigmentosa => "retinitis_pigmentosa",
            Disease::Stargardt => "stargardt",
            Disease::RetinalDetachment => "retinal_detachment",
            Disease::CentralSerous => "central_serous",
            Disease::Myopia => "myopia",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Disease::Glaucoma => "Glaucoma",
            Disease::DryMacularDegeneration => "Dry age-related macular degeneration",
            Disease::WetMacularDegeneration => "Wet age-related macular degeneration",
            Disease::Cataract => "Cataract",
            Disease::DiabeticRetinopathy => "Diabetic retinopathy",
            Disease::RetinitisPigmentosa => "Retinitis pigmentosa",
            Disease::Stargardt => "Stargardt disease",
            Disease::RetinalDetachment => "Retinal detachment",
            Disease::CentralSerous => "Central serous chorioretinopathy",
            Disease::Myopia => "Myopia",
        }
    }

    /// Recognized parameters with their defaults and bounds.
    pub fn params(&self) -> &'static [ParamSpec] {
        match self {
            Disease::Glaucoma => glaucoma::PARAMS,
            Disease::DryMacularDegeneration => amd_dry::PARAMS,
            Disease::WetMacularDegeneration => amd_wet::PARAMS,
            Disease::Cataract => cataract::PARAMS,
            Disease::DiabeticRetinopathy => diabetic_retinopathy::PARAMS,
            Disease::RetinitisPigmentosa => retinitis_pigmentosa::PARAMS,
            Disease::Stargardt => stargardt::PARAMS,
            Disease::RetinalDetachment => retinal_detachment::PARAMS,
            Disease::CentralSerous => central_serous::PARAMS,
            Disease::Myopia => myopia::PARAMS,
        }
    }

    /// Builds the effect descriptor from `values`.
    pub fn descriptor(&self, values: &ValueMap) -> Result<EffectDescriptor, Error> {
        let descriptor = match self {
            Disease::Glaucoma => glaucoma::descriptor(values)?,
            Disease::DryMacularDegeneration => amd_dry::descriptor(values)?,
            Disease::WetMacularDegeneration => amd_wet::descriptor(values)?,
            Disease::Cataract => cataract::descriptor(values)?,
            Disease::DiabeticRetinopathy => diabetic_retinopathy::descriptor(values)?,
            Disease::RetinitisPigmentosa => retinitis_pigmentosa::descriptor(values)?,
            Disease::Stargardt => stargardt::descriptor(values)?,
            Disease::RetinalDetachment => retinal_detachment::descriptor(values)?,
            Disease::CentralSerous => central_serous::descriptor(values)?,
            Disease::Myopia => myopia::descriptor(values)?,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// The subset of `values` whose keys belong to this disease.
    pub fn own_values(&self, values: &ValueMap) -> ValueMap {
        values
            .iter()
            .filter(|(key, _)| self.params().iter().any(|spec| spec.key == key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Disease {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Disease::ALL
            .iter()
            .find(|disease| disease.key() == wanted)
            .copied()
            .ok_or_else(|| Error::UnknownDisease(s.to_string()))
    }
}

/// Ordered severity thresholds read from the `s1..sn` parameters.
fn bands(values: &ValueMap, thresholds: &[ParamSpec]) -> Bands {
    let edges: Vec<f32> = thresholds.iter().map(|spec| spec.resolve_f32(values)).collect();
    Bands::clamped(&edges)
}

/// Threshold `S_k`, or full severity when the preset has fewer thresholds.
fn edge(bands: &Bands, k: usize) -> f32 {
    bands.threshold(k).unwrap_or(1.0)
}

fn ramp(knots: &[(f32, f32)]) -> Result<Ramp, Error> {
    Ramp::new(knots.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for disease in Disease::ALL.iter() {
            assert_eq!(disease.key().parse::<Disease>().unwrap(), *disease);
        }
        assert_eq!("Retinal-Detachment".parse::<Disease>().unwrap(), Disease::RetinalDetachment);
        assert!("scurvy".parse::<Disease>().is_err());
    }

    #[test]
    fn parameter_keys_carry_the_disease_prefix() {
        for disease in Disease::ALL.iter() {
            for spec in disease.params() {
                assert!(spec.key.starts_with(disease.key()), "{}", spec.key);
                assert!(spec.min <= spec.default && spec.default <= spec.max, "{}", spec.key);
            }
        }
    }

    #[test]
    fn own_values_filters_foreign_keys() {
        let mut values = ValueMap::new();
        values.insert("glaucoma_s1".into(), Value::Number(0.3));
        values.insert("cataract_blur".into(), Value::Number(0.1));
        let own = Disease::Glaucoma.own_values(&values);
        assert_eq!(own.len(), 1);
        assert!(own.contains_key("glaucoma_s1"));
    }

    #[test]
    fn defaults_build_valid_descriptors() {
        for disease in Disease::ALL.iter() {
            let descriptor = disease.descriptor(&ValueMap::new()).unwrap();
            assert!(!descriptor.layers.is_empty());
        }
    }
}
