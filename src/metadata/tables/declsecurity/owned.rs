use std::sync::Arc;

use crate::metadata::{
    tables::{CustomAttributeList, DeclSecurityRc, SecurityAction, TableId},
    token::Token,
};

/// Marker opening a permission set in the binary format
const BINARY_FORMAT_MARKER: u8 = b'.';

/// A permission set declared for one security action
#[derive(Debug)]
pub struct DeclSecurity {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this declaration
    pub token: Token,
    /// Raw `SecurityAction` value, kept as stored even when out of range
    pub action: u16,
    /// The encoded permission set
    pub permission_set: Vec<u8>,
    /// Custom attributes applied to this declaration
    pub custom_attributes: CustomAttributeList,
}

impl DeclSecurity {
    /// Create a declaration in memory
    #[must_use]
    pub fn new(action: SecurityAction, permission_set: Vec<u8>) -> DeclSecurityRc {
        Arc::new(DeclSecurity {
            rid: 0,
            token: Token::from_parts(TableId::DeclSecurity, 0),
            action: action as u16,
            permission_set,
            custom_attributes: Arc::new(boxcar::Vec::new()),
        })
    }

    /// The decoded action, `None` if the stored value is not a defined action
    #[must_use]
    pub fn security_action(&self) -> Option<SecurityAction> {
        SecurityAction::from_u16(self.action)
    }

    /// Returns `true` if the permission set uses the binary format rather than XML
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.permission_set.first() == Some(&BINARY_FORMAT_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            config::LoaderConfig,
            tables::{Assembly, TypeAttributes, TypeDef},
        },
        test::widget_provider,
    };

    #[test]
    fn actions_decode() {
        let demand = DeclSecurity::new(SecurityAction::Demand, b".\x01".to_vec());
        assert_eq!(demand.security_action(), Some(SecurityAction::Demand));
        assert!(demand.is_binary());

        let xml = DeclSecurity::new(SecurityAction::LinkDemand, "<PermissionSet/>".into());
        assert!(!xml.is_binary());
        assert_eq!(SecurityAction::from_u16(0x0E), Some(SecurityAction::PermitOnly));
        assert_eq!(SecurityAction::from_u16(0x0F), None);
    }

    #[test]
    fn declarations_load_lazily_per_parent() {
        let (mut provider, tokens) = widget_provider(true);
        let assembly_token = Token::from_parts(TableId::Assembly, 1);
        let inheritance = SecurityAction::InheritanceDemand as u16;
        provider.add_decl_security(tokens.widget, inheritance, b".\x00".to_vec());
        provider.add_decl_security(tokens.spin, SecurityAction::Demand as u16, b".\x01".to_vec());
        provider.add_decl_security(tokens.spin, 0x7F, Vec::new());
        let minimum = SecurityAction::RequestMinimum as u16;
        provider.add_decl_security(assembly_token, minimum, Vec::new());

        let assembly = Assembly::from_provider(Arc::new(provider), LoaderConfig::default()).unwrap();
        let widget = assembly.find_by_name("Demo", "Widget").unwrap();
        let spin = widget.find_method("Spin", None).unwrap();

        assert_eq!(widget.decl_securities().count(), 1);
        assert!(widget.has_decl_securities());

        let on_spin: Vec<_> = spin.decl_securities().iter().map(|(_, d)| d.clone()).collect();
        assert_eq!(on_spin.len(), 2);
        assert_eq!(on_spin[0].security_action(), Some(SecurityAction::Demand));
        assert_eq!(on_spin[1].action, 0x7F);
        assert!(on_spin[1].security_action().is_none());
        assert!(Arc::ptr_eq(&spin.decl_securities(), &spin.decl_securities()));

        let on_assembly = assembly.decl_securities();
        assert_eq!(on_assembly.count(), 1);
        assert_eq!(
            on_assembly.get(0).unwrap().security_action(),
            Some(SecurityAction::RequestMinimum)
        );
    }

    #[test]
    fn in_memory_entities_start_without_declarations() {
        let ty = TypeDef::new("Demo", "Plain", TypeAttributes::PUBLIC);
        assert!(!ty.has_decl_securities());
        ty.decl_securities()
            .push(DeclSecurity::new(SecurityAction::Assert, Vec::new()));
        assert!(ty.has_decl_securities());
    }
}
