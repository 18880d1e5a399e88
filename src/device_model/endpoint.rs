// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Endpoint: a logical grouping of features (§3.2).

use std::collections::BTreeMap;

use crate::device_model::feature::Feature;

pub struct Endpoint {
    pub id: u8,
    pub endpoint_type: String,
    pub label: String,
    pub features: BTreeMap<u8, Feature>,
}

impl Endpoint {
    pub fn new(id: u8, endpoint_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            endpoint_type: endpoint_type.into(),
            label: label.into(),
            features: BTreeMap::new(),
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature.feature_type, feature);
        self
    }
}
