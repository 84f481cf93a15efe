mod compute;
mod error;
mod identity;
mod network;
mod storage;

pub use compute::{
    CreateVnicDetails, Instance, InstanceShapeConfig, InstanceSourceDetails,
    LaunchInstanceDetails, LaunchInstanceShapeConfigDetails,
};
pub use error::OciErrorBody;
pub use identity::{Tenancy, User};
pub use network::{GetPublicIpByPrivateIpIdDetails, PrivateIp, PublicIp, VnicAttachment};
pub use storage::{BootVolume, Volume};

use serde::{Deserialize, Serialize};

/// Lifecycle states shared by instances, volumes and attachments.
///
/// The control plane uses a different state set per resource kind; anything not listed here
/// lands in `Other` so new states never break decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Provisioning,
    Running,
    Starting,
    Stopping,
    Stopped,
    Moving,
    CreatingImage,
    Available,
    Restoring,
    Faulty,
    Attaching,
    Attached,
    Detaching,
    Detached,
    Terminating,
    Terminated,
    #[serde(other)]
    Other,
}

impl LifecycleState {
    /// `true` once the resource is going away and no longer counts against quotas.
    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Terminating | Self::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_state_decodes_as_other() {
        let state: LifecycleState = serde_json::from_str(r#""UPDATING""#).expect("decode state");
        assert_eq!(state, LifecycleState::Other);
        assert!(!state.is_terminated());
    }

    #[test]
    fn terminating_and_terminated_are_terminal() {
        for raw in [r#""TERMINATING""#, r#""TERMINATED""#] {
            let state: LifecycleState = serde_json::from_str(raw).expect("decode state");
            assert!(state.is_terminated(), "{raw} should be terminal");
        }
        let running: LifecycleState = serde_json::from_str(r#""RUNNING""#).expect("decode");
        assert!(!running.is_terminated());
    }
}
