use thiserror::Error;

use crate::{BodyHandle, JointHandle};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("body capacity of {limit} exhausted")]
    BodyCapacity { limit: usize },
    #[error("joint capacity of {limit} exhausted")]
    JointCapacity { limit: usize },
    #[error("body {0} is no longer in the world")]
    StaleBody(BodyHandle),
    #[error("joint {0} is no longer in the world")]
    StaleJoint(JointHandle),
    #[error("joint cannot connect body {0} to itself")]
    SelfJoint(BodyHandle),
    #[error("body {0} is not in kinematic target mode")]
    NotKinematic(BodyHandle),
    #[error("invalid description: {0}")]
    InvalidDescription(&'static str),
}
