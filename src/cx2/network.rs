// network.rs - Minimal CX2 document model

//! The subset of the CX2 format this tool consumes and produces: attribute
//! declarations, network attributes, nodes, edges and the two visual
//! aspects. Every other aspect of an incoming document is ignored, which is
//! all the loader needs from the NeST model.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A CX2 node: identifier, optional layout coordinates and the attribute
/// map stored under `v` in the wire format.
#[derive(Debug, Clone, Default)]
pub struct Cx2Node {
    pub id: i64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub v: Map<String, Value>,
}

impl Cx2Node {
    /// Node name as stored in the wire format, where `n` is the usual alias
    /// for the declared `name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.v
            .get("n")
            .or_else(|| self.v.get("name"))
            .and_then(Value::as_str)
    }
}

/// A CX2 edge between node ids `s` and `t`.
#[derive(Debug, Clone, Default)]
pub struct Cx2Edge {
    pub id: i64,
    pub s: i64,
    pub t: i64,
    pub v: Map<String, Value>,
}

/// An in-memory CX2 network.
#[derive(Debug, Clone, Default)]
pub struct Cx2Network {
    pub attribute_declarations: Map<String, Value>,
    pub network_attributes: Map<String, Value>,
    pub nodes: BTreeMap<i64, Cx2Node>,
    pub edges: BTreeMap<i64, Cx2Edge>,
    pub visual_properties: Option<Value>,
    pub visual_editor_properties: Option<Value>,
}

impl Cx2Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CX2 document (a JSON array of aspect fragments).
    pub fn from_cx2(doc: &Value) -> Result<Self, String> {
        let aspects = doc
            .as_array()
            .ok_or("CX2 document must be a JSON array of aspects")?;

        let mut network = Cx2Network::new();

        for fragment in aspects {
            let obj = match fragment.as_object() {
                Some(o) => o,
                None => continue,
            };
            for (aspect, payload) in obj {
                match aspect.as_str() {
                    "attributeDeclarations" => {
                        for decl in payload.as_array().into_iter().flatten() {
                            if let Some(decl) = decl.as_object() {
                                for (k, v) in decl {
                                    network
                                        .attribute_declarations
                                        .insert(k.clone(), v.clone());
                                }
                            }
                        }
                    }
                    "networkAttributes" => {
                        for attrs in payload.as_array().into_iter().flatten() {
                            if let Some(attrs) = attrs.as_object() {
                                for (k, v) in attrs {
                                    network.network_attributes.insert(k.clone(), v.clone());
                                }
                            }
                        }
                    }
                    "nodes" => {
                        for item in payload.as_array().into_iter().flatten() {
                            let node = parse_node(item)?;
                            network.nodes.insert(node.id, node);
                        }
                    }
                    "edges" => {
                        for item in payload.as_array().into_iter().flatten() {
                            let edge = parse_edge(item)?;
                            network.edges.insert(edge.id, edge);
                        }
                    }
                    "visualProperties" => {
                        network.visual_properties = Some(payload.clone());
                    }
                    "visualEditorProperties" => {
                        network.visual_editor_properties = Some(payload.clone());
                    }
                    // CXVersion, hasFragments, metaData, status, opaque aspects
                    _ => {}
                }
            }
        }

        Ok(network)
    }

    pub fn add_node(&mut self, id: i64, v: Map<String, Value>) {
        self.nodes.insert(
            id,
            Cx2Node {
                id,
                x: None,
                y: None,
                v,
            },
        );
    }

    pub fn add_edge(&mut self, id: i64, s: i64, t: i64, v: Map<String, Value>) {
        self.edges.insert(id, Cx2Edge { id, s, t, v });
    }

    /// Regenerate the attribute declarations from the attributes actually
    /// present on the network, its nodes and its edges. Datatypes are
    /// inferred from the first value seen for each attribute name.
    pub fn rebuild_declarations(&mut self) {
        let mut decls = Map::new();

        let network_decl = declarations_for(self.network_attributes.iter());
        if !network_decl.is_empty() {
            decls.insert("networkAttributes".to_string(), Value::Object(network_decl));
        }

        let node_decl = declarations_for(self.nodes.values().flat_map(|n| n.v.iter()));
        if !node_decl.is_empty() {
            decls.insert("nodes".to_string(), Value::Object(node_decl));
        }

        let edge_decl = declarations_for(self.edges.values().flat_map(|e| e.v.iter()));
        if !edge_decl.is_empty() {
            decls.insert("edges".to_string(), Value::Object(edge_decl));
        }

        self.attribute_declarations = decls;
    }

    /// Serialize to a CX2 document in canonical aspect order.
    pub fn to_cx2(&self) -> Value {
        let mut aspects = Vec::new();
        aspects.push(json!({"CXVersion": "2.0", "hasFragments": false}));

        let mut meta = Vec::new();
        if !self.attribute_declarations.is_empty() {
            meta.push(json!({"name": "attributeDeclarations", "elementCount": 1}));
        }
        if !self.network_attributes.is_empty() {
            meta.push(json!({"name": "networkAttributes", "elementCount": 1}));
        }
        meta.push(json!({"name": "nodes", "elementCount": self.nodes.len()}));
        meta.push(json!({"name": "edges", "elementCount": self.edges.len()}));
        if self.visual_properties.is_some() {
            meta.push(json!({"name": "visualProperties", "elementCount": 1}));
        }
        if self.visual_editor_properties.is_some() {
            meta.push(json!({"name": "visualEditorProperties", "elementCount": 1}));
        }
        aspects.push(json!({ "metaData": meta }));

        if !self.attribute_declarations.is_empty() {
            aspects.push(json!({
                "attributeDeclarations": [Value::Object(self.attribute_declarations.clone())]
            }));
        }
        if !self.network_attributes.is_empty() {
            aspects.push(json!({
                "networkAttributes": [Value::Object(self.network_attributes.clone())]
            }));
        }

        let nodes: Vec<Value> = self.nodes.values().map(node_to_value).collect();
        aspects.push(json!({ "nodes": nodes }));

        let edges: Vec<Value> = self
            .edges
            .values()
            .map(|e| json!({"id": e.id, "s": e.s, "t": e.t, "v": Value::Object(e.v.clone())}))
            .collect();
        aspects.push(json!({ "edges": edges }));

        if let Some(vp) = &self.visual_properties {
            aspects.push(json!({ "visualProperties": vp }));
        }
        if let Some(vep) = &self.visual_editor_properties {
            aspects.push(json!({ "visualEditorProperties": vep }));
        }

        aspects.push(json!({"status": [{"error": "", "success": true}]}));
        Value::Array(aspects)
    }
}

fn parse_node(item: &Value) -> Result<Cx2Node, String> {
    let obj = item.as_object().ok_or("CX2 node must be an object")?;
    let id = obj
        .get("id")
        .and_then(Value::as_i64)
        .ok_or("CX2 node is missing its 'id'")?;
    Ok(Cx2Node {
        id,
        x: obj.get("x").and_then(Value::as_f64),
        y: obj.get("y").and_then(Value::as_f64),
        v: obj
            .get("v")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    })
}

fn parse_edge(item: &Value) -> Result<Cx2Edge, String> {
    let obj = item.as_object().ok_or("CX2 edge must be an object")?;
    let id = obj
        .get("id")
        .and_then(Value::as_i64)
        .ok_or("CX2 edge is missing its 'id'")?;
    let s = obj
        .get("s")
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("CX2 edge {} is missing its source 's'", id))?;
    let t = obj
        .get("t")
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("CX2 edge {} is missing its target 't'", id))?;
    Ok(Cx2Edge {
        id,
        s,
        t,
        v: obj
            .get("v")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    })
}

fn node_to_value(node: &Cx2Node) -> Value {
    let mut obj = Map::new();
    obj.insert("id".to_string(), json!(node.id));
    if let Some(x) = node.x {
        obj.insert("x".to_string(), json!(x));
    }
    if let Some(y) = node.y {
        obj.insert("y".to_string(), json!(y));
    }
    obj.insert("v".to_string(), Value::Object(node.v.clone()));
    Value::Object(obj)
}

/// CX2 datatype for a JSON value.
pub fn infer_datatype(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "long"
            } else {
                "double"
            }
        }
        Value::Array(_) => "list_of_string",
        _ => "string",
    }
}

fn declarations_for<'a, I>(attrs: I) -> Map<String, Value>
where
    I: Iterator<Item = (&'a String, &'a Value)>,
{
    let mut decl = Map::new();
    for (name, value) in attrs {
        decl.entry(name.clone())
            .or_insert_with(|| json!({"d": infer_datatype(value)}));
    }
    decl
}
