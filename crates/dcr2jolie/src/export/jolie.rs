//! Jolie service-skeleton generation.
//!
//! For a projection of actor `A`, this backend emits two files:
//! `<A>Interfaces.iol` with one interface block per counterparty, and
//! `<A>Service.ol` with the service declaration, one input port per
//! initiator the actor receives from and one output port per receiver the
//! actor sends to.
//!
//! All groupings iterate in lexicographic order (roles, then activity ids),
//! so generation is byte-stable across runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::info;

use dcr2jolie_core::{activity::Activity, graph::Projection};

use crate::export::{Error, Exporter};

/// The generated skeleton texts for one projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JolieSkeleton {
    /// The actor the skeleton was generated for.
    pub actor: String,
    /// File name of the interfaces file, `<A>Interfaces.iol`.
    pub interfaces_filename: String,
    /// Contents of the interfaces file.
    pub interfaces: String,
    /// File name of the service file, `<A>Service.ol`.
    pub service_filename: String,
    /// Contents of the service file.
    pub service: String,
}

/// The name of the interface invoked by `from` on `to`.
pub fn interface_name(from: &str, to: &str) -> String {
    format!("{from}{to}Interface")
}

/// File name of an actor's interfaces file.
pub fn interfaces_filename(actor: &str) -> String {
    format!("{actor}Interfaces.iol")
}

/// File name of an actor's service file.
pub fn service_filename(actor: &str) -> String {
    format!("{actor}Service.ol")
}

/// Map a DCR datatype tag to the Jolie type it is emitted as.
///
/// `text` becomes `string` and `float` becomes `double`; the types Jolie
/// shares with DCR pass through; a missing or empty tag is `void`; anything
/// else is `CUSTOM`.
pub fn jolie_datatype(activity: &Activity) -> &str {
    match activity.datatype() {
        None | Some("") => "void",
        Some("text") => "string",
        Some("float") => "double",
        Some(shared @ ("void" | "bool" | "int" | "long" | "raw" | "any")) => shared,
        Some(_) => "CUSTOM",
    }
}

/// One `oneWay` operation entry: the lower-cased label with spaces replaced
/// by underscores, and the mapped datatype.
pub fn operation(activity: &Activity) -> String {
    format!(
        "{}({})",
        activity.label().to_lowercase().replace(' ', "_"),
        jolie_datatype(activity)
    )
}

fn interface_block(from: &str, to: &str, events: &[&Activity]) -> String {
    let operations: Vec<String> = events.iter().copied().map(operation).collect();
    format!(
        "interface {}{{\n\toneWay:\n\t\t{}\n}}\n\n",
        interface_name(from, to),
        operations.join(",\n\t\t")
    )
}

fn port(is_input: bool, from: &str, to: &str) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "\t{}putPort {}Service {{\n",
        if is_input { "in" } else { "out" },
        if is_input {
            format!("in{from}")
        } else {
            format!("out{to}")
        },
    ));
    text.push_str(&format!(
        "\t\tlocation: \"socket://localhost:port_of_{}putPort_'{}Service'_in_{}\"\n",
        if is_input { "out" } else { "in" },
        if is_input {
            format!("out{to}")
        } else {
            format!("in{from}")
        },
        if is_input { from } else { to },
    ));
    text.push_str("\t\tprotocol: http { format = \"json\"}\n");
    text.push_str(&format!("\t\tinterfaces: {}\n", interface_name(from, to)));
    text.push_str("\t}\n\n");
    text
}

/// Generate the Jolie skeleton texts for one projection.
///
/// Interactions partition into inputs (the actor receives) grouped by
/// initiator, and outputs (the actor initiates) grouped per receiver; each
/// group becomes one interface and one port.
pub fn generate(projection: &Projection) -> JolieSkeleton {
    let actor = projection.actor();

    let mut in_interfaces: BTreeMap<&str, Vec<&Activity>> = BTreeMap::new();
    let mut out_interfaces: BTreeMap<&str, Vec<&Activity>> = BTreeMap::new();
    for activity in projection.graph().interactions() {
        if activity.is_output() == Some(true) {
            for receiver in activity.receivers().into_iter().flatten() {
                out_interfaces
                    .entry(receiver.as_str())
                    .or_default()
                    .push(activity);
            }
        } else if let Some(initiator) = activity.initiator() {
            in_interfaces.entry(initiator).or_default().push(activity);
        }
    }

    let mut interfaces = String::new();
    for (from, events) in &in_interfaces {
        interfaces.push_str(&interface_block(from, actor, events));
    }
    for (to, events) in &out_interfaces {
        interfaces.push_str(&interface_block(actor, to, events));
    }

    let execution = if projection.is_user_actor() {
        "single"
    } else {
        "sequential"
    };
    let mut service = format!("include \"{}\"", interfaces_filename(actor));
    service.push_str(&format!(
        "\n\nservice {actor}Service{{\n\texecution: {{{execution}}}\n\n"
    ));
    for from in in_interfaces.keys() {
        service.push_str(&port(true, from, actor));
    }
    for to in out_interfaces.keys() {
        service.push_str(&port(false, actor, to));
    }
    service.push_str("\n\tmain {\n\n\t}\n}");

    JolieSkeleton {
        actor: actor.to_string(),
        interfaces_filename: interfaces_filename(actor),
        interfaces,
        service_filename: service_filename(actor),
        service,
    }
}

/// Exporter that writes the two skeleton files of each projection into an
/// output directory, creating it if missing.
#[derive(Debug, Clone)]
pub struct JolieGenerator {
    output_dir: PathBuf,
}

impl JolieGenerator {
    /// Create a generator writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Exporter for JolieGenerator {
    fn export_projection(&mut self, projection: &Projection) -> Result<(), Error> {
        let skeleton = generate(projection);

        fs::create_dir_all(&self.output_dir).map_err(Error::Io)?;
        let interfaces_path = self.output_dir.join(&skeleton.interfaces_filename);
        let service_path = self.output_dir.join(&skeleton.service_filename);
        fs::write(&interfaces_path, &skeleton.interfaces).map_err(Error::Io)?;
        fs::write(&service_path, &skeleton.service).map_err(Error::Io)?;

        info!(
            actor = skeleton.actor,
            interfaces = interfaces_path.display().to_string(),
            service = service_path.display().to_string();
            "Jolie skeleton written"
        );
        Ok(())
    }
}
