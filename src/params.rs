//! Render configuration supplied once at renderer construction.

use serde::{Deserialize, Serialize};

use crate::error::{LogoError, Result};

/// Parameters for the liquid shader.
///
/// Every field is required. `edge` and `pattern_blur` are uploaded as uniforms
/// but the fragment program does not read them; they are accepted and kept
/// inert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RenderParams {
    pub edge: f32,
    pub pattern_blur: f32,
    /// Noise lattice density, must be > 0.
    pub pattern_scale: f32,
    /// Displacement gain applied to the noise bump.
    pub refraction: f32,
    /// Time-scale multiplier.
    pub speed: f32,
    /// Noise gain.
    pub liquid: f32,
}

impl RenderParams {
    /// Preset used by the bundled demo page.
    pub const DEMO: RenderParams = RenderParams {
        edge: 2.0,
        pattern_blur: 0.005,
        pattern_scale: 2.0,
        refraction: 0.015,
        speed: 0.3,
        liquid: 0.07,
    };

    /// Parse and validate parameters from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: RenderParams =
            serde_json::from_str(json).map_err(|e| LogoError::InvalidParams(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("edge", self.edge),
            ("patternBlur", self.pattern_blur),
            ("patternScale", self.pattern_scale),
            ("refraction", self.refraction),
            ("speed", self.speed),
            ("liquid", self.liquid),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LogoError::InvalidParams(format!("{name} is not finite: {value}")));
        }
        if self.pattern_scale <= 0.0 {
            return Err(LogoError::InvalidParams(format!(
                "patternScale must be positive, got {}",
                self.pattern_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "edge": 2, "patternBlur": 0.005, "patternScale": 2,
            "refraction": 0.015, "speed": 0.3, "liquid": 0.07
        }"#;
        assert_eq!(RenderParams::from_json(json).unwrap(), RenderParams::DEMO);
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"{"edge": 2, "patternBlur": 0.005, "patternScale": 2, "refraction": 0.015, "speed": 0.3}"#;
        assert!(matches!(
            RenderParams::from_json(json),
            Err(LogoError::InvalidParams(_))
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let json = r#"{"edge": 2, "patternBlur": 0.005, "patternScale": 2,
            "refraction": 0.015, "speed": 0.3, "liquid": 0.07, "glow": 1}"#;
        assert!(RenderParams::from_json(json).is_err());
    }

    #[test]
    fn non_positive_pattern_scale_is_rejected() {
        let params = RenderParams {
            pattern_scale: 0.0,
            ..RenderParams::DEMO
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let params = RenderParams {
            speed: f32::NAN,
            ..RenderParams::DEMO
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("speed"));
    }
}
