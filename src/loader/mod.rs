// mod.rs - NeST subnetwork loading pipeline

//! One-shot pipeline: fetch the NeST model, load the IAS score table, then
//! build, style, annotate and upload one interaction network per assembly
//! below the size cutoff.

use crate::cli::{Args, ValidationResult};
use crate::config::NdexCredentials;
use crate::cx2::{Cx2Network, Cx2Node, NestStyle};
use crate::ias::{self, IasScoreMap};
use crate::ndex::{normalize_host, NdexClient, Visibility};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// NDEx UUID of the published NeST model.
pub const DEFAULT_NEST_UUID: &str = "274fcd6c-1adc-11ea-a741-0660b7976219";

/// Version stamped on every generated network, matching the NeST release.
pub const NETWORK_VERSION: &str = "20211001";

const CCMI_LINK: &str = "https://ccmi.org/nest";
const HIVIEW_LINK: &str =
    "http://hiview.ucsd.edu/274fcd6c-1adc-11ea-a741-0660b7976219?type=test&server=https://test.ndexbio.edu";

fn description() -> String {
    format!(
        "<p>This network represents a subsystem of the \
         <a target=\"_blank\" href=\"{}\">CCMI NeST</a> hierarchy.<br/>\
         <a target=\"_blank\" href=\"{}\">\
         Click here to view the whole hierarchy in HiView</a></p>",
        CCMI_LINK, HIVIEW_LINK
    )
}

const REFERENCE: &str = concat!(
    "<p>Zheng F, Kelly MR, Ramms DJ, et al.<br/>",
    "<b>Interpretation of cancer mutations using a multiscale map of protein systems</b><br/>",
    "Science. 2021; 374(6563):eabf3067<br/>",
    "doi: <a href=\"https://doi.org/10.1126/science.abf3067\">10.1126/science.abf3067</a></p>"
);

/// Assembly node attributes that do not become network attributes: they are
/// either replaced (`name`), expanded into the network itself (`Genes`) or
/// derivable from it (`Size`, `Size-Log`).
const EXCLUDED_ASSEMBLY_ATTRIBUTES: [&str; 6] =
    ["n", "name", "Annotation", "Size", "Size-Log", "Genes"];

/// Result of one NDEx write decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Updated(String),
    SkippedDryRun,
}

pub struct NestLoader {
    nest: String,
    ias_score: String,
    maxsize: usize,
    conf: Option<String>,
    profile: String,
    visibility: Visibility,
    dryrun: bool,
    nest_pattern: Regex,
    credentials: Option<NdexCredentials>,
    client: Option<NdexClient>,
}

impl NestLoader {
    pub fn new(args: &Args, validated: ValidationResult) -> Self {
        NestLoader {
            nest: args.nest.clone(),
            ias_score: args.ias_score.clone(),
            maxsize: args.maxsize,
            conf: args.conf.clone(),
            profile: args.profile.clone(),
            visibility: validated.visibility,
            dryrun: args.dryrun,
            nest_pattern: validated.nest_pattern,
            credentials: None,
            client: None,
        }
    }

    /// User agent sent with every NDEx request.
    pub fn user_agent(&self) -> String {
        format!("nestloader/{}", crate::VERSION)
    }

    /// Run the whole pipeline.
    pub fn run(&mut self) -> Result<(), String> {
        self.parse_config()?;
        self.create_ndex_connection();

        println!("⏳ Fetching NeST model {} from NDEx ...", self.nest);
        let doc = self.client()?.get_network_as_cx2(&self.nest)?;
        let hierarchy = Cx2Network::from_cx2(&doc)?;
        println!(
            "✅ NeST model loaded: {} nodes, {} edges",
            hierarchy.nodes.len(),
            hierarchy.edges.len()
        );

        let scores = IasScoreMap::load(&self.ias_score)?;
        let network_dict = self.fetch_network_dict()?;
        let style = NestStyle::packaged()?;

        let mut created = 0;
        let mut updated = 0;
        let mut skipped_size = 0;
        let mut skipped_no_edges = 0;

        for node in hierarchy.nodes.values() {
            let (assembly_name, genes) = match self.get_name_and_genes_from_node(node) {
                Some(found) => found,
                None => continue,
            };

            if self.exceeds_maxsize(&genes) {
                println!(
                    "⏭️  Skipping {}: {} genes exceeds --maxsize cutoff of {}",
                    assembly_name,
                    genes.len(),
                    self.maxsize
                );
                skipped_size += 1;
                continue;
            }

            let mut sub_network = self.build_subnetwork(&genes, &scores);
            if sub_network.edges.is_empty() {
                println!(
                    "⏭️  Skipping {}: no IAS interaction among its {} genes",
                    assembly_name,
                    genes.len()
                );
                skipped_no_edges += 1;
                continue;
            }

            let net_name = self.network_name(&assembly_name);
            let mut net_attrs = assembly_attributes(node);
            self.update_network_attributes(&net_name, &mut net_attrs);
            sub_network.network_attributes = net_attrs;
            sub_network.rebuild_declarations();
            style.apply(&mut sub_network);

            match self.save_update_network(&net_name, &sub_network.to_cx2(), &network_dict)? {
                SaveOutcome::Created(_) => created += 1,
                SaveOutcome::Updated(_) => updated += 1,
                SaveOutcome::SkippedDryRun => {}
            }
        }

        println!("\n🎉 === NEST SUBNETWORK LOAD COMPLETED ===");
        println!("📊 Networks created: {}", created);
        println!("📊 Networks updated: {}", updated);
        println!(
            "📊 Assemblies skipped: {} over --maxsize, {} without interactions",
            skipped_size, skipped_no_edges
        );
        if self.dryrun {
            println!("💡 Dry run: nothing was written to NDEx");
        }
        Ok(())
    }

    /// Read NDEx credentials from the configuration file.
    pub fn parse_config(&mut self) -> Result<(), String> {
        let credentials = NdexCredentials::load(self.conf.as_deref(), &self.profile)?;
        self.credentials = Some(credentials);
        Ok(())
    }

    /// Create the NDEx connection, unless one is already set.
    pub fn create_ndex_connection(&mut self) {
        if self.client.is_some() {
            return;
        }
        if let Some(creds) = &self.credentials {
            self.client = Some(NdexClient::new(
                &creds.server,
                &creds.user,
                &creds.password,
                &self.user_agent(),
            ));
        }
    }

    fn client(&self) -> Result<&NdexClient, String> {
        self.client
            .as_ref()
            .ok_or_else(|| "No NDEx connection (missing credentials?)".to_string())
    }

    /// Networks already owned by the account, keyed by name. Used to decide
    /// between creating a network and updating it in place.
    fn fetch_network_dict(&self) -> Result<HashMap<String, String>, String> {
        let client = self.client()?;
        let user = client.get_user()?;
        let summaries = client.get_user_network_summaries(&user.external_id)?;
        let dict: HashMap<String, String> = summaries
            .into_iter()
            .filter_map(|s| s.name.map(|name| (name, s.external_id)))
            .collect();
        println!(
            "📋 Found {} networks owned by {} on NDEx",
            dict.len(),
            user.user_name
        );
        Ok(dict)
    }

    /// Assembly name and gene list of a NeST node, or `None` when the node
    /// is not an assembly (name not matching the `NEST:` pattern) or has no
    /// `Genes` attribute.
    pub fn get_name_and_genes_from_node(&self, node: &Cx2Node) -> Option<(String, Vec<String>)> {
        let node_name = node.name()?;
        if !self.nest_pattern.is_match(node_name) {
            return None;
        }

        let genes: Vec<String> = node
            .v
            .get("Genes")
            .and_then(Value::as_str)?
            .split_whitespace()
            .map(|g| g.to_string())
            .collect();
        if genes.is_empty() {
            return None;
        }

        let assembly_name = node
            .v
            .get("Annotation")
            .and_then(Value::as_str)
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(node_name)
            .to_string();

        Some((assembly_name, genes))
    }

    /// True when an assembly holds more genes than the `--maxsize` cutoff.
    /// An assembly with exactly `maxsize` genes is still extracted.
    pub fn exceeds_maxsize(&self, genes: &[String]) -> bool {
        genes.len() > self.maxsize
    }

    /// Final network name: a leading `NEST:` is rewritten to `NeST:`, any
    /// other assembly name gets the `NeST: ` prefix.
    pub fn network_name(&self, assembly_name: &str) -> String {
        if self.nest_pattern.is_match(assembly_name) {
            self.nest_pattern
                .replace(assembly_name, "NeST:")
                .into_owned()
        } else {
            format!("NeST: {}", assembly_name)
        }
    }

    /// Build the interaction network for one assembly: a node per gene, an
    /// edge per gene pair found in the IAS score map (either direction).
    pub fn build_subnetwork(&self, genes: &[String], scores: &IasScoreMap) -> Cx2Network {
        let mut network = Cx2Network::new();

        for (node_id, gene) in genes.iter().enumerate() {
            let mut v = Map::new();
            v.insert("name".to_string(), Value::String(gene.clone()));
            network.add_node(node_id as i64, v);
        }

        let mut edge_id = 0;
        for i in 0..genes.len() {
            for j in (i + 1)..genes.len() {
                if let Some(row) = scores.interaction(&genes[i], &genes[j]) {
                    network.add_edge(edge_id, i as i64, j as i64, ias::edge_attributes(row));
                    edge_id += 1;
                }
            }
        }

        network
    }

    /// Set the fixed network attributes: name, description, version,
    /// reference and provenance. Replaces any `Description` carried over
    /// from the assembly node.
    pub fn update_network_attributes(&self, name: &str, net_attrs: &mut Map<String, Value>) {
        net_attrs.remove("Description");
        net_attrs.insert("name".to_string(), Value::String(name.to_string()));
        net_attrs.insert("description".to_string(), Value::String(description()));
        net_attrs.insert(
            "version".to_string(),
            Value::String(NETWORK_VERSION.to_string()),
        );
        net_attrs.insert("reference".to_string(), Value::String(REFERENCE.to_string()));
        net_attrs.insert(
            "prov:wasGeneratedBy".to_string(),
            Value::String(format!(
                "nestloader {} on {}",
                crate::VERSION,
                chrono::Utc::now().format("%Y-%m-%d")
            )),
        );
    }

    /// Create the network, or update it in place when the account already
    /// owns a network of the same name. Dry runs log the decision and stop.
    pub fn save_update_network(
        &self,
        name: &str,
        cx2: &Value,
        network_dict: &HashMap<String, String>,
    ) -> Result<SaveOutcome, String> {
        match network_dict.get(name) {
            Some(uuid) => {
                if self.dryrun {
                    println!("💡 Dry run: would update '{}' ({})", name, uuid);
                    return Ok(SaveOutcome::SkippedDryRun);
                }
                self.client()?.update_cx2_network(cx2, uuid)?;
                println!("🔄 Updated '{}': {}", name, self.network_url(uuid));
                Ok(SaveOutcome::Updated(uuid.clone()))
            }
            None => {
                if self.dryrun {
                    println!("💡 Dry run: would create '{}'", name);
                    return Ok(SaveOutcome::SkippedDryRun);
                }
                let uuid = self.client()?.save_new_cx2_network(cx2, self.visibility)?;
                println!("🆕 Created '{}': {}", name, self.network_url(&uuid));
                Ok(SaveOutcome::Created(uuid))
            }
        }
    }

    /// Viewer URL for a network. The production server is browsed through
    /// www.ndexbio.org, every other deployment through its own host.
    pub fn network_url(&self, uuid: &str) -> String {
        match self.credentials.as_ref().map(|c| normalize_host(&c.server)) {
            Some(host) if host != "public.ndexbio.org" && !host.starts_with("www.") => {
                format!("https://{}/viewer/networks/{}", host, uuid)
            }
            _ => format!("https://www.ndexbio.org/viewer/networks/{}", uuid),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_server_for_tests(&mut self, server: &str) {
        self.credentials = Some(NdexCredentials {
            user: "user".to_string(),
            password: "pass".to_string(),
            server: server.to_string(),
        });
    }
}

/// Copy the assembly node attributes onto the network, minus the handful
/// that are replaced or expanded.
pub fn assembly_attributes(node: &Cx2Node) -> Map<String, Value> {
    node.v
        .iter()
        .filter(|(name, _)| !EXCLUDED_ASSEMBLY_ATTRIBUTES.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::validate_args;
    use serde_json::json;

    fn test_args() -> Args {
        Args {
            nest: DEFAULT_NEST_UUID.to_string(),
            ias_score: "scores.tsv".to_string(),
            maxsize: 100,
            conf: None,
            profile: "ndexnestloader".to_string(),
            visibility: "PUBLIC".to_string(),
            dryrun: false,
        }
    }

    fn test_loader() -> NestLoader {
        let args = test_args();
        let validated = validate_args(&args).unwrap();
        NestLoader::new(&args, validated)
    }

    fn example_nest_node() -> Cx2Node {
        let v = json!({
            "n": "NEST:169",
            "Mutation frequency:OV": 0.078,
            "Mutation frequency:KIRC": 0.084,
            "Genes": "AKT1 CTNNB1 EGF EGFR ILK JADE1 NF2 PPL PTEN SLC9A3R1 STUB1 VIM YWHAZ",
            "Size": 13,
            "No. significantly mutated cancer types": 4,
            "Mutation frequency:LUSC": 0.209,
            "-log10 adjusted p-value": 0,
            "Mutation frequency:GBM": 0.504,
            "adjusted  p-value": 1,
            "Mutation frequency:BRCA": 0.125,
            "Mutation frequency:LUAD": 0.235,
            "Mutation frequency:BLCA": 0.22,
            "Mutation frequency:UCEC": 0.713,
            "Mutation frequency:LIHC": 0.344,
            "Annotation": "AKT1 activation",
            "Weight": 0.37,
            "No. significantly mutated cancer types (aggregate)": 4,
            "Mutation frequency:SKCM": 0.393,
            "Mutation frequency:HNSC": 0.133,
            "Significantly mutated cancer types (aggregate)": "BRCA GBM LIHC UCEC",
            "Significantly mutated cancer types": "BRCA GBM LIHC UCEC",
            "Mutation frequency:COAD": 0.225,
            "Size-Log": 3.700439718141092,
            "Mutation frequency:STAD": 0.239,
            "NEST ID": "NEST:169"
        });
        Cx2Node {
            id: 41376,
            x: Some(-1622.0690606338903),
            y: Some(-684.7666702109273),
            v: v.as_object().unwrap().clone(),
        }
    }

    #[test]
    fn test_user_agent() {
        let loader = test_loader();
        assert_eq!(loader.user_agent(), format!("nestloader/{}", crate::VERSION));
    }

    #[test]
    fn test_name_and_genes_from_node() {
        let loader = test_loader();
        let (name, genes) = loader
            .get_name_and_genes_from_node(&example_nest_node())
            .unwrap();
        assert_eq!(name, "AKT1 activation");
        assert_eq!(
            genes,
            vec![
                "AKT1", "CTNNB1", "EGF", "EGFR", "ILK", "JADE1", "NF2", "PPL", "PTEN",
                "SLC9A3R1", "STUB1", "VIM", "YWHAZ"
            ]
        );
    }

    #[test]
    fn test_name_and_genes_from_node_no_attributes() {
        let loader = test_loader();
        let mut node = example_nest_node();
        node.v = Map::new();
        assert!(loader.get_name_and_genes_from_node(&node).is_none());
    }

    #[test]
    fn test_name_and_genes_from_node_no_genes() {
        let loader = test_loader();
        let mut node = example_nest_node();
        node.v.remove("Genes");
        assert!(loader.get_name_and_genes_from_node(&node).is_none());
    }

    #[test]
    fn test_name_and_genes_from_node_not_an_assembly() {
        let loader = test_loader();
        let mut node = example_nest_node();
        node.v
            .insert("n".to_string(), json!("Vesicle membrane fusion"));
        assert!(loader.get_name_and_genes_from_node(&node).is_none());
    }

    #[test]
    fn test_name_and_genes_falls_back_to_node_name() {
        let loader = test_loader();
        let mut node = example_nest_node();
        node.v.remove("Annotation");
        let (name, _) = loader.get_name_and_genes_from_node(&node).unwrap();
        assert_eq!(name, "NEST:169");
    }

    #[test]
    fn test_maxsize_cutoff_boundary() {
        let mut loader = test_loader();
        loader.maxsize = 3;
        let genes: Vec<String> = ["AKT1", "PTEN", "EGFR"].iter().map(|g| g.to_string()).collect();

        // exactly at the cutoff is kept, one more is skipped
        assert!(!loader.exceeds_maxsize(&genes));
        let mut larger = genes.clone();
        larger.push("VIM".to_string());
        assert!(loader.exceeds_maxsize(&larger));
    }

    #[test]
    fn test_description_carries_links() {
        let text = description();
        assert!(text.starts_with("<p>This"));
        assert!(text.contains(CCMI_LINK));
        assert!(text.contains(HIVIEW_LINK));
    }

    #[test]
    fn test_network_name() {
        let loader = test_loader();
        assert_eq!(loader.network_name("NEST:169"), "NeST:169");
        assert_eq!(
            loader.network_name("AKT1 activation"),
            "NeST: AKT1 activation"
        );
    }

    #[test]
    fn test_assembly_attributes() {
        let node = example_nest_node();
        let net_attrs = assembly_attributes(&node);

        assert_eq!(net_attrs.len(), 21);
        for attr in ["n", "name", "Annotation", "Size", "Size-Log", "Genes"] {
            assert!(!net_attrs.contains_key(attr));
        }
        assert_eq!(net_attrs["adjusted  p-value"], json!(1));
        assert_eq!(net_attrs["NEST ID"], json!("NEST:169"));
    }

    #[test]
    fn test_update_network_attributes() {
        let loader = test_loader();
        let mut net_attrs = Map::new();
        net_attrs.insert("Description".to_string(), json!("hi"));

        loader.update_network_attributes("foo", &mut net_attrs);

        assert_eq!(net_attrs["name"], json!("foo"));
        assert!(!net_attrs.contains_key("Description"));
        assert!(net_attrs["description"]
            .as_str()
            .unwrap()
            .starts_with("<p>This"));
        assert_eq!(net_attrs["version"], json!("20211001"));
        assert!(net_attrs["reference"].as_str().unwrap().starts_with("<p>Zh"));
        assert!(net_attrs["prov:wasGeneratedBy"]
            .as_str()
            .unwrap()
            .starts_with("nestloader"));
    }

    #[test]
    fn test_build_subnetwork() {
        let loader = test_loader();
        let table = "Protein 1\tProtein 2\tIntegrated score\n\
                     AKT1\tPTEN\t0.91\n\
                     EGFR\tAKT1\t0.55\n";
        let scores = IasScoreMap::from_reader(table.as_bytes()).unwrap();
        let genes: Vec<String> = ["AKT1", "PTEN", "EGFR", "VIM"]
            .iter()
            .map(|g| g.to_string())
            .collect();

        let network = loader.build_subnetwork(&genes, &scores);

        assert_eq!(network.nodes.len(), 4);
        assert_eq!(network.nodes[&0].v["name"], json!("AKT1"));

        // AKT1-PTEN in table direction, AKT1-EGFR in the reverse direction,
        // VIM interacts with nothing
        assert_eq!(network.edges.len(), 2);
        let akt1_pten = &network.edges[&0];
        assert_eq!((akt1_pten.s, akt1_pten.t), (0, 1));
        assert_eq!(akt1_pten.v["Integrated score"], json!(0.91));
        assert!(!akt1_pten.v.contains_key("Protein 1"));

        let akt1_egfr = &network.edges[&1];
        assert_eq!((akt1_egfr.s, akt1_egfr.t), (0, 2));
        assert_eq!(akt1_egfr.v["Integrated score"], json!(0.55));
    }

    #[test]
    fn test_build_subnetwork_no_interactions() {
        let loader = test_loader();
        let table = "Protein 1\tProtein 2\tIntegrated score\nA1BG\tABCB4\t0.2\n";
        let scores = IasScoreMap::from_reader(table.as_bytes()).unwrap();
        let genes = vec!["AKT1".to_string(), "PTEN".to_string()];

        let network = loader.build_subnetwork(&genes, &scores);
        assert_eq!(network.nodes.len(), 2);
        assert!(network.edges.is_empty());
    }

    #[test]
    fn test_network_url_server_none() {
        let loader = test_loader();
        assert_eq!(
            loader.network_url("12345"),
            "https://www.ndexbio.org/viewer/networks/12345"
        );
    }

    #[test]
    fn test_network_url_server_is_prod() {
        let mut loader = test_loader();
        loader.set_server_for_tests("public.ndexbio.org");
        assert_eq!(
            loader.network_url("12345"),
            "https://www.ndexbio.org/viewer/networks/12345"
        );
    }

    #[test]
    fn test_network_url_server_is_test() {
        let mut loader = test_loader();
        loader.set_server_for_tests("test.ndexbio.org");
        assert_eq!(
            loader.network_url("12345"),
            "https://test.ndexbio.org/viewer/networks/12345"
        );
    }

    #[test]
    fn test_save_update_network_dryrun_create() {
        let mut loader = test_loader();
        loader.dryrun = true;
        let outcome = loader
            .save_update_network("x", &json!([]), &HashMap::new())
            .unwrap();
        assert_eq!(outcome, SaveOutcome::SkippedDryRun);
    }

    #[test]
    fn test_save_update_network_dryrun_update() {
        let mut loader = test_loader();
        loader.dryrun = true;
        let mut dict = HashMap::new();
        dict.insert("x".to_string(), "12345".to_string());
        let outcome = loader.save_update_network("x", &json!([]), &dict).unwrap();
        assert_eq!(outcome, SaveOutcome::SkippedDryRun);
    }

    #[test]
    fn test_save_update_network_without_connection() {
        let loader = test_loader();
        // not a dry run and no client configured: must refuse, not panic
        let err = loader
            .save_update_network("x", &json!([]), &HashMap::new())
            .unwrap_err();
        assert!(err.contains("No NDEx connection"));
    }
}
