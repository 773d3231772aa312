// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs, Debug)]
/// nestloader - Loads NeST interactome subnetworks into NDEx
///
/// Credentials are read from an INI configuration file (default
/// ~/.ndexutils.conf) under the section named by --profile:
///
///   [ndexnestloader]
///   user = <NDEx username>
///   password = <NDEx password>
///   server = <NDEx server, e.g. public.ndexbio.org>
pub struct Args {
    /// NDEx UUID of the NeST model network used to extract subnetworks
    #[argh(
        option,
        default = "String::from(crate::loader::DEFAULT_NEST_UUID)"
    )]
    pub nest: String,

    /// IAS score table, either a local TSV file or an http(s) URL.
    /// Note the dash: the flag is --ias-score, not --ias_score
    #[argh(option)]
    pub ias_score: String,

    /// maximum number of genes in a NeST assembly to extract (default: 100)
    #[argh(option, default = "100")]
    pub maxsize: usize,

    /// configuration file to load (default: ~/.ndexutils.conf)
    #[argh(option)]
    pub conf: Option<String>,

    /// profile section in the configuration file holding the NDEx
    /// credentials (default: ndexnestloader)
    #[argh(option, default = "String::from(\"ndexnestloader\")")]
    pub profile: String,

    /// visibility of newly created networks on NDEx: PUBLIC or PRIVATE
    /// (default: PUBLIC)
    #[argh(option, default = "String::from(\"PUBLIC\")")]
    pub visibility: String,

    /// run the pipeline without writing anything to NDEx
    #[argh(switch)]
    pub dryrun: bool,
}
