//! Transform forms of page elements

use serde::Deserialize;

use crate::pages::Transform;
use crate::pages::is_valid_scale;
use crate::storage::UpdateTransformValues;

use super::Error;
use super::Patch;

/// Validate a coordinate or rotation
pub fn parse_coordinate(value: f64, field: &str) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::bad_request("Invalid transform")
            .with_details(format!("`{field}` must be a finite number")))
    }
}

fn parse_scale(scale: f64) -> Result<f64, Error> {
    if is_valid_scale(scale) {
        Ok(scale)
    } else {
        Err(Error::bad_request("Invalid transform")
            .with_details("`scale` must be a positive number"))
    }
}

/// Transform provided on creation, every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct TransformForm {
    x: Option<f64>,
    y: Option<f64>,
    scale: Option<f64>,
    rotation: Option<f64>,
}

impl TransformForm {
    /// Validate into a transform, missing fields get their defaults
    pub fn into_transform(self) -> Result<Transform, Error> {
        let defaults = Transform::default();

        Ok(Transform {
            x: parse_coordinate(self.x.unwrap_or(defaults.x), "x")?,
            y: parse_coordinate(self.y.unwrap_or(defaults.y), "y")?,
            scale: parse_scale(self.scale.unwrap_or(defaults.scale))?,
            rotation: parse_coordinate(self.rotation.unwrap_or(defaults.rotation), "rotation")?,
        })
    }
}

/// Transform fields to change, none can be cleared
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransformForm {
    #[serde(default)]
    x: Patch<f64>,
    #[serde(default)]
    y: Patch<f64>,
    #[serde(default)]
    scale: Patch<f64>,
    #[serde(default)]
    rotation: Patch<f64>,
}

impl UpdateTransformForm {
    /// Validate into update values
    pub fn into_values(self) -> Result<UpdateTransformValues, Error> {
        Ok(UpdateTransformValues {
            x: self
                .x
                .required("x")?
                .map(|x| parse_coordinate(x, "x"))
                .transpose()?,
            y: self
                .y
                .required("y")?
                .map(|y| parse_coordinate(y, "y"))
                .transpose()?,
            scale: self.scale.required("scale")?.map(parse_scale).transpose()?,
            rotation: self
                .rotation
                .required("rotation")?
                .map(|rotation| parse_coordinate(rotation, "rotation"))
                .transpose()?,
        })
    }
}
