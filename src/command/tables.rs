//! Built-in operation tables for the buildah CLI.
//!
//! Each function returns the declarative spec for one operation. Parameter
//! names follow buildah's own option names in snake_case; aliases keep the
//! older module parameter names (`name`, `imgname`, `dest`, ...) working.

use super::rule::OptionRule;
use super::spec::{ChangePolicy, OperationSpec};

/// Names of all built-in operations, in table order.
pub const OPERATION_NAMES: [&str; 10] = [
    "add",
    "commit",
    "config",
    "containers",
    "images",
    "mount",
    "push",
    "rm",
    "rmi",
    "run",
];

/// All built-in operation specs.
pub fn builtin_specs() -> Vec<OperationSpec> {
    vec![
        add(),
        commit(),
        config(),
        containers(),
        images(),
        mount(),
        push(),
        rm(),
        rmi(),
        run(),
    ]
}

/// `buildah add [--chown U:G] [--quiet] container src dest`
pub fn add() -> OperationSpec {
    OperationSpec::new("add", ChangePolicy::Mutating)
        .option(OptionRule::value("chown", "--chown"))
        .option(OptionRule::switch("quiet", "--quiet"))
        .positional(OptionRule::positional("container").alias("name"))
        .positional(OptionRule::positional("src"))
        .positional(OptionRule::positional("dest"))
}

/// `buildah commit [options] container image`
pub fn commit() -> OperationSpec {
    OperationSpec::new("commit", ChangePolicy::Mutating)
        .option(OptionRule::path("authfile", "--authfile"))
        .option(OptionRule::path("cert_dir", "--cert-dir").alias("certdir"))
        .option(OptionRule::value("creds", "--creds"))
        .option(OptionRule::switch("disable_compression", "--disable-compression"))
        .option(OptionRule::value("format", "--format"))
        .option(OptionRule::path("iidfile", "--iidfile"))
        .option(OptionRule::switch("quiet", "--quiet"))
        .option(OptionRule::switch("rm", "--rm"))
        .option(OptionRule::switch("squash", "--squash"))
        .option(OptionRule::switch("tls_verify", "--tls-verify=false").negated())
        .positional(OptionRule::positional("container"))
        .positional(OptionRule::positional("image_name").alias("imgname"))
}

/// `buildah config [options] container`
pub fn config() -> OperationSpec {
    OperationSpec::new("config", ChangePolicy::Mutating)
        .option(OptionRule::repeat("annotation", "--annotation"))
        .option(OptionRule::value("arch", "--arch"))
        .option(OptionRule::value("author", "--author"))
        .option(OptionRule::value("cmd", "--cmd"))
        .option(OptionRule::value("comment", "--comment"))
        .option(OptionRule::value("created_by", "--created-by"))
        .option(OptionRule::value("domainname", "--domainname").alias("domain"))
        .option(OptionRule::value("entrypoint", "--entrypoint"))
        .option(OptionRule::repeat("env", "--env"))
        .option(OptionRule::value("healthcheck", "--healthcheck"))
        .option(OptionRule::value("healthcheck_interval", "--healthcheck-interval"))
        .option(OptionRule::int("healthcheck_retries", "--healthcheck-retries").always())
        .option(OptionRule::value(
            "healthcheck_start_period",
            "--healthcheck-start-period",
        ))
        .option(OptionRule::value("healthcheck_timeout", "--healthcheck-timeout"))
        .option(OptionRule::value("history_comment", "--history-comment"))
        .option(OptionRule::value("hostname", "--hostname"))
        .option(OptionRule::repeat("label", "--label"))
        .option(OptionRule::repeat("onbuild", "--onbuild"))
        .option(OptionRule::value("os", "--os"))
        .option(OptionRule::repeat("port", "--port"))
        .option(OptionRule::value("shell", "--shell"))
        .option(OptionRule::value("stop_signal", "--stop-signal"))
        .option(OptionRule::value("user", "--user"))
        .option(OptionRule::repeat("volume", "--volume"))
        .option(OptionRule::path("workingdir", "--workingdir"))
        .positional(OptionRule::positional("container").alias("name"))
}

/// `buildah containers [options]`
pub fn containers() -> OperationSpec {
    OperationSpec::new("containers", ChangePolicy::ReadOnly)
        .option(OptionRule::switch("json", "--json"))
        .option(OptionRule::switch("truncate", "--notruncate").negated())
        .option(OptionRule::switch("quiet", "--quiet"))
        .option(OptionRule::value("format", "--format"))
        .option(OptionRule::value("filter", "--filter"))
        .option(OptionRule::switch("heading", "--noheading").negated())
}

/// `buildah images [options] [image]`
pub fn images() -> OperationSpec {
    OperationSpec::new("images", ChangePolicy::ReadOnly)
        .option(OptionRule::switch("json", "--json"))
        .option(OptionRule::switch("truncate", "--no-trunc").negated())
        .option(OptionRule::switch("digests", "--digests"))
        .option(OptionRule::value("format", "--format"))
        .option(OptionRule::repeat("filter", "--filter"))
        .option(OptionRule::switch("heading", "--noheading").negated())
        .positional(OptionRule::positional("name").optional())
}

/// `buildah mount [--notruncate] container`
pub fn mount() -> OperationSpec {
    OperationSpec::new("mount", ChangePolicy::ReadOnly)
        .option(OptionRule::switch("truncate", "--notruncate").negated())
        .positional(OptionRule::positional("container").alias("name"))
}

/// `buildah push [options] image [destination]`
pub fn push() -> OperationSpec {
    OperationSpec::new("push", ChangePolicy::Mutating)
        .option(OptionRule::path("authfile", "--authfile"))
        .option(OptionRule::path("cert_dir", "--cert-dir"))
        .option(OptionRule::value("creds", "--creds"))
        .option(OptionRule::path("signature_policy", "--signature-policy"))
        .option(OptionRule::switch("tls_verify", "--tls-verify=false").negated())
        .option(OptionRule::switch("quiet", "--quiet"))
        .positional(OptionRule::positional("image").alias("name"))
        .positional(OptionRule::positional("destination").alias("dest").optional())
}

/// `buildah rm (--all | container)`
pub fn rm() -> OperationSpec {
    OperationSpec::new("rm", ChangePolicy::Mutating)
        .option(OptionRule::switch("all", "--all"))
        .positional(OptionRule::positional("name").optional())
        .exclusive(&["name", "all"])
        .one_of(&["name", "all"])
}

/// `buildah rmi [--all] [--force] [--prune] [image...]`
pub fn rmi() -> OperationSpec {
    OperationSpec::new("rmi", ChangePolicy::Mutating)
        .option(OptionRule::switch("all", "--all"))
        .option(OptionRule::switch("force", "--force"))
        .option(OptionRule::switch("prune", "--prune"))
        .positional(OptionRule::positional_list("name"))
        .exclusive(&["name", "all"])
        .one_of(&["name", "all", "prune"])
}

/// `buildah run [options] container command [args...]`
pub fn run() -> OperationSpec {
    OperationSpec::new("run", ChangePolicy::Mutating)
        .option(OptionRule::repeat("cap_add", "--cap-add").combined(","))
        .option(OptionRule::repeat("cap_drop", "--cap-drop").combined(","))
        .option(OptionRule::path("cni_config_dir", "--cni-config-dir"))
        .option(OptionRule::path("cni_plugin_path", "--cni-plugin-path"))
        .option(OptionRule::value("hostname", "--hostname"))
        .option(OptionRule::value("ipc", "--ipc"))
        .option(OptionRule::value("isolation", "--isolation"))
        .option(OptionRule::value("network", "--net").alias("net"))
        .option(OptionRule::switch("no_pivot", "--no-pivot").alias("pivot"))
        .option(OptionRule::value("pid", "--pid"))
        .option(OptionRule::value("runtime", "--runtime"))
        .option(OptionRule::repeat("runtime_flag", "--runtime-flag"))
        .option(OptionRule::repeat("security_opt", "--security-opt").alias("security_options"))
        .option(OptionRule::value("user", "--user"))
        .option(OptionRule::value("uts", "--uts"))
        .option(OptionRule::repeat("volume", "--volume"))
        .positional(OptionRule::positional("container").alias("name"))
        .positional(OptionRule::positional("command"))
        .positional(OptionRule::positional_list("args").allow_dashes())
}
