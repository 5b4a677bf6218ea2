// ABOUTME: Named workflows selectable from the command line.
// ABOUTME: Each maps to an ordered state sequence in StateData.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workflow {
    Start,
    Stop,
    Restart,
    AccountCreation,
    Debug,
}

impl Workflow {
    pub fn name(self) -> &'static str {
        match self {
            Workflow::Start => "start",
            Workflow::Stop => "stop",
            Workflow::Restart => "restart",
            Workflow::AccountCreation => "accountCreation",
            Workflow::Debug => "debug",
        }
    }

    /// Workflows that bring the network up and may stay attached to it.
    pub fn is_startup(self) -> bool {
        matches!(self, Workflow::Start | Workflow::Restart)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workflow '{0}'")]
pub struct UnknownWorkflow(pub String);

impl FromStr for Workflow {
    type Err = UnknownWorkflow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Workflow::Start),
            "stop" => Ok(Workflow::Stop),
            "restart" => Ok(Workflow::Restart),
            "accountCreation" => Ok(Workflow::AccountCreation),
            "debug" => Ok(Workflow::Debug),
            other => Err(UnknownWorkflow(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for workflow in [
            Workflow::Start,
            Workflow::Stop,
            Workflow::Restart,
            Workflow::AccountCreation,
            Workflow::Debug,
        ] {
            assert_eq!(workflow.name().parse::<Workflow>(), Ok(workflow));
        }
        assert!("generate-accounts".parse::<Workflow>().is_err());
    }
}
