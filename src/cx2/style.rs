// style.rs - Packaged visual style for NeST subnetworks

use crate::cx2::Cx2Network;
use serde_json::Value;

/// Visual style document shipped with the tool, exported from the styled
/// NeST networks on NDEx.
const STYLE_CX2: &str = include_str!("style.cx2");

/// The visual aspects applied to every generated subnetwork.
#[derive(Debug, Clone)]
pub struct NestStyle {
    pub visual_properties: Value,
    pub visual_editor_properties: Option<Value>,
}

impl NestStyle {
    /// Load the style packaged with the binary.
    pub fn packaged() -> Result<Self, String> {
        let doc: Value = serde_json::from_str(STYLE_CX2)
            .map_err(|e| format!("Packaged style.cx2 is not valid JSON: {}", e))?;
        let network = Cx2Network::from_cx2(&doc)?;
        let visual_properties = network
            .visual_properties
            .ok_or("Packaged style.cx2 has no visualProperties aspect")?;
        Ok(NestStyle {
            visual_properties,
            visual_editor_properties: network.visual_editor_properties,
        })
    }

    /// Stamp the style onto a network.
    pub fn apply(&self, network: &mut Cx2Network) {
        network.visual_properties = Some(self.visual_properties.clone());
        network.visual_editor_properties = self.visual_editor_properties.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packaged_style_parses() {
        let style = NestStyle::packaged().unwrap();
        let defaults = &style.visual_properties[0]["default"];
        assert!(defaults["node"].get("NODE_BACKGROUND_COLOR").is_some());
        assert!(style.visual_editor_properties.is_some());
    }

    #[test]
    fn test_apply_to_network() {
        let style = NestStyle::packaged().unwrap();
        let mut network = Cx2Network::new();
        style.apply(&mut network);
        assert!(network.visual_properties.is_some());

        // the label mapping must target the node name attribute we generate
        let mapping = &network.visual_properties.unwrap()[0]["nodeMapping"];
        assert_eq!(mapping["NODE_LABEL"]["definition"]["attribute"], "name");
    }
}
