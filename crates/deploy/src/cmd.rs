//! Command builder for `forge create`.

/// Builder for `forge create` invocations.
#[derive(Debug, Clone)]
pub struct ForgeCreateCmdBuilder {
    binary: String,
    legacy: bool,
    rpc_url: String,
    private_key: String,
    src: String,
    constructor_args: Vec<String>,
    extra_args: Vec<String>,
}

impl ForgeCreateCmdBuilder {
    /// Create a new builder deploying `src` (a `path:ContractName` locator).
    pub fn new(
        rpc_url: impl Into<String>,
        private_key: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        Self {
            binary: "forge".to_string(),
            legacy: true,
            rpc_url: rpc_url.into(),
            private_key: private_key.into(),
            src: src.into(),
            constructor_args: Vec::new(),
            extra_args: Vec::new(),
        }
    }

    /// Set the tool binary.
    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Toggle legacy (pre EIP-1559) transactions.
    pub fn legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    /// Set the already resolved constructor arguments.
    pub fn constructor_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.constructor_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add extra arguments, placed right after the base flags.
    pub fn extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build the full argv, binary first.
    pub fn build(self) -> Vec<String> {
        let mut cmd = vec![self.binary, "create".to_string()];

        if self.legacy {
            cmd.push("--legacy".to_string());
        }

        cmd.extend(self.extra_args);

        cmd.push("--rpc-url".to_string());
        cmd.push(self.rpc_url);

        if !self.constructor_args.is_empty() {
            cmd.push("--constructor-args".to_string());
            cmd.extend(self.constructor_args);
        }

        cmd.push("--private-key".to_string());
        cmd.push(self.private_key);

        cmd.push(self.src);

        cmd
    }
}

/// Render an argv for logging with the value following `--private-key` masked.
pub fn redact_private_key(cmd: &[String]) -> String {
    let mut redacted = Vec::with_capacity(cmd.len());
    let mut mask_next = false;
    for arg in cmd {
        if mask_next {
            redacted.push("<redacted>");
            mask_next = false;
            continue;
        }
        mask_next = arg == "--private-key";
        redacted.push(arg.as_str());
    }
    redacted.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forge_create_slot_order() {
        let cmd = ForgeCreateCmdBuilder::new("http://localhost:8545", "0xkey", "src/A.sol:A")
            .constructor_args(["0x1", "7"])
            .build();

        assert_eq!(
            cmd,
            vec![
                "forge",
                "create",
                "--legacy",
                "--rpc-url",
                "http://localhost:8545",
                "--constructor-args",
                "0x1",
                "7",
                "--private-key",
                "0xkey",
                "src/A.sol:A",
            ]
        );
    }

    #[test]
    fn test_forge_create_without_constructor_args() {
        let cmd = ForgeCreateCmdBuilder::new("http://rpc", "0xkey", "src/A.sol:A").build();

        assert!(!cmd.contains(&"--constructor-args".to_string()));
        assert_eq!(cmd.last().map(String::as_str), Some("src/A.sol:A"));
    }

    #[test]
    fn test_forge_create_options() {
        let cmd = ForgeCreateCmdBuilder::new("http://rpc", "0xkey", "src/A.sol:A")
            .binary("/opt/foundry/bin/forge")
            .legacy(false)
            .extra_args(["--json", "--broadcast"])
            .build();

        assert_eq!(cmd[0], "/opt/foundry/bin/forge");
        assert!(!cmd.contains(&"--legacy".to_string()));
        assert_eq!(&cmd[2..4], ["--json", "--broadcast"]);
    }

    #[test]
    fn test_redact_private_key() {
        let cmd = ForgeCreateCmdBuilder::new("http://rpc", "0xsecret", "src/A.sol:A").build();
        let rendered = redact_private_key(&cmd);

        assert!(!rendered.contains("0xsecret"));
        assert!(rendered.contains("--private-key <redacted> src/A.sol:A"));
    }
}
