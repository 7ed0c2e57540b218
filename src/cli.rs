use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ebscost")]
#[command(version, about = "Monthly cost of the EBS volumes in an AWS region")]
pub struct Cli {
    /// AWS region code, e.g. us-east-1
    #[arg(required_unless_present_any = ["init", "print", "check"])]
    pub region: Option<String>,

    /// Profile of the shared credentials file
    #[arg(short = 'p', long = "profile")]
    pub profile: Option<String>,

    /// AWS access key id
    #[arg(short = 'i', long = "aws-id", requires = "aws_secret_key")]
    pub aws_id: Option<String>,

    /// AWS secret access key
    #[arg(short = 'k', long = "aws-secret-key", requires = "aws_id")]
    pub aws_secret_key: Option<String>,

    /// Show per-type tables and unused volume ids
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Read `aws ec2 describe-volumes` JSON output instead of calling EC2 (`-` for stdin)
    #[arg(long = "volumes", value_name = "FILE")]
    pub volumes: Option<String>,

    /// Print the report as JSON
    #[arg(long = "json", conflicts_with = "verbose")]
    pub json: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long = "debug")]
    pub debug: bool,

    /// Initialize config file
    #[arg(long = "init")]
    pub init: bool,

    /// Print current configuration
    #[arg(long = "print")]
    pub print: bool,

    /// Check configuration
    #[arg(long = "check")]
    pub check: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Access key pair when both halves were given
    pub fn explicit_keys(&self) -> Option<(String, String)> {
        match (&self.aws_id, &self.aws_secret_key) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}
