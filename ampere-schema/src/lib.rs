pub mod oci;
pub mod telegram;

pub use oci::{
    BootVolume, CreateVnicDetails, GetPublicIpByPrivateIpIdDetails, Instance,
    InstanceShapeConfig, InstanceSourceDetails, LaunchInstanceDetails,
    LaunchInstanceShapeConfigDetails, LifecycleState, OciErrorBody, PrivateIp, PublicIp, Tenancy,
    User, VnicAttachment, Volume,
};
pub use telegram::{
    DeleteMessageRequest, EditMessageTextRequest, SendMessageRequest, TelegramMessage,
    TelegramResponse,
};
