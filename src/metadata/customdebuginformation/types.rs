use uguid::{guid, Guid};

/// Well-known custom debug information kinds attached to methods, identified by GUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomDebugKind {
    /// Scopes of locals hoisted into a state machine
    StateMachineHoistedLocalScopes,
    /// `dynamic` flags of local variables
    DynamicLocalVariables,
    /// Tuple element names of local variables
    TupleElementNames,
    /// Edit-and-continue local slot map
    EncLocalSlotMap,
    /// Edit-and-continue lambda and closure map
    EncLambdaAndClosureMap,
    /// Source Link information for source file mapping
    SourceLink,
    /// Embedded source file content
    EmbeddedSource,
    /// Any other kind
    Unknown(Guid),
}

const HOISTED_LOCAL_SCOPES: Guid = guid!("6da9a61e-f8c7-4874-be62-68bc5630df71");
const DYNAMIC_LOCALS: Guid = guid!("83c563c4-b4f3-47d5-b824-ba5441477ea8");

const WELL_KNOWN: [(Guid, CustomDebugKind); 7] = [
    (HOISTED_LOCAL_SCOPES, CustomDebugKind::StateMachineHoistedLocalScopes),
    (DYNAMIC_LOCALS, CustomDebugKind::DynamicLocalVariables),
    (
        guid!("ed9fdf71-8879-4747-8ed3-fe5ede3ce710"),
        CustomDebugKind::TupleElementNames,
    ),
    (
        guid!("755f52a8-91c5-45be-b4b8-209571e552bd"),
        CustomDebugKind::EncLocalSlotMap,
    ),
    (
        guid!("a643004c-0240-496f-a783-30d64f4979de"),
        CustomDebugKind::EncLambdaAndClosureMap,
    ),
    (
        guid!("cc110556-a091-4d38-9fec-25ab9a351a6a"),
        CustomDebugKind::SourceLink,
    ),
    (
        guid!("0e8a571b-6926-466e-b4ad-8ab04611f5fe"),
        CustomDebugKind::EmbeddedSource,
    ),
];

impl CustomDebugKind {
    /// Classify a kind GUID
    #[must_use]
    pub fn from_guid(guid: Guid) -> Self {
        WELL_KNOWN
            .iter()
            .find(|(known, _)| *known == guid)
            .map_or(CustomDebugKind::Unknown(guid), |(_, kind)| *kind)
    }

    /// The GUID identifying this kind
    #[must_use]
    pub fn guid(&self) -> Guid {
        match self {
            CustomDebugKind::Unknown(guid) => *guid,
            known => WELL_KNOWN
                .iter()
                .find(|(_, kind)| kind == known)
                .map_or(Guid::ZERO, |(guid, _)| *guid),
        }
    }
}

/// One custom debug information record.
///
/// The blob is kept undecoded; interpreting it is up to the debug-symbol layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDebugInfo {
    /// The kind of record
    pub kind: CustomDebugKind,
    /// The raw record
    pub data: Vec<u8>,
}

impl CustomDebugInfo {
    /// Create a record from its kind GUID and blob
    #[must_use]
    pub fn new(kind: Guid, data: Vec<u8>) -> Self {
        CustomDebugInfo {
            kind: CustomDebugKind::from_guid(kind),
            data,
        }
    }

    /// Returns `true` if the kind is one of the well-known kinds
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self.kind, CustomDebugKind::Unknown(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_guid() {
        assert_eq!(
            CustomDebugKind::from_guid(guid!("cc110556-a091-4d38-9fec-25ab9a351a6a")),
            CustomDebugKind::SourceLink
        );

        let other = guid!("00000000-0000-0000-0000-000000000001");
        assert_eq!(
            CustomDebugKind::from_guid(other),
            CustomDebugKind::Unknown(other)
        );
    }

    #[test]
    fn guid_roundtrip() {
        let kind = CustomDebugKind::StateMachineHoistedLocalScopes;
        assert_eq!(CustomDebugKind::from_guid(kind.guid()), kind);
    }

    #[test]
    fn known() {
        let info = CustomDebugInfo::new(DYNAMIC_LOCALS, vec![1, 0, 1]);
        assert!(info.is_known());
        assert!(!CustomDebugInfo::new(Guid::ZERO, vec![]).is_known());
    }
}
