mod args;

pub use args::{
    CliArgs, CommandKind, CompareArgs, CompletionsArgs, ConfigArgs, NormalizeArgs, OutputFlags,
    SideArgs, SnapshotArgs, build_cli,
};

pub fn parse() -> CliArgs {
    args::parse_args()
}
