//! Protocols, definitions, and creation parameters.
//!
//! A protocol is the typed façade callers hold: a hand-written struct
//! wrapping an [`ActorRef`], with one method per declared message. The
//! trait also carries the instantiator that turns a [`Definition`] into a
//! fresh actor body, both at first spawn and again on every
//! supervision-driven restart.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::reference::ActorRef;
use super::traits::Actor;
use crate::mailbox::MailboxKind;
use crate::util::Address;

/// A typed actor façade.
///
/// # Example
/// ```rust,ignore
/// use stagework::prelude::*;
///
/// pub struct Counter {
///     reference: ActorRef<CounterActor>,
/// }
///
/// impl Counter {
///     pub fn increment(&self) -> Completion<()> {
///         self.reference.send(Increment)
///     }
///
///     pub fn value(&self) -> Completion<u64> {
///         self.reference.send(GetValue)
///     }
/// }
///
/// impl Protocol for Counter {
///     type Body = CounterActor;
///
///     fn type_name() -> &'static str {
///         "Counter"
///     }
///
///     fn instantiate(_definition: &Definition) -> CounterActor {
///         CounterActor { count: 0 }
///     }
///
///     fn from_ref(reference: ActorRef<CounterActor>) -> Self {
///         Self { reference }
///     }
///
///     fn reference(&self) -> &ActorRef<CounterActor> {
///         &self.reference
///     }
/// }
/// ```
pub trait Protocol: Send + Sized + 'static {
    /// The actor body behind this façade.
    type Body: Actor;

    /// Logical protocol name.
    fn type_name() -> &'static str;

    /// Build a fresh body from a definition. Called at spawn and on every
    /// restart, always with the original definition.
    fn instantiate(definition: &Definition) -> Self::Body;

    /// Wrap a reference in the façade.
    fn from_ref(reference: ActorRef<Self::Body>) -> Self;

    /// The underlying reference.
    fn reference(&self) -> &ActorRef<Self::Body>;

    /// Address of the actor behind the façade.
    fn address(&self) -> &Address {
        self.reference().address()
    }

    /// True once the actor behind the façade has stopped.
    fn is_stopped(&self) -> bool {
        self.reference().is_stopped()
    }
}

/// Ordered, type-erased creation parameters.
///
/// Values are recovered by position and type. Build with the
/// [`parameters!`](crate::parameters) macro or [`Parameters::from_values`].
#[derive(Clone, Default)]
pub struct Parameters {
    values: Arc<Vec<Box<dyn Any + Send + Sync>>>,
}

impl Parameters {
    /// No parameters.
    pub fn none() -> Self {
        Self::default()
    }

    /// Wrap pre-boxed values.
    pub fn from_values(values: Vec<Box<dyn Any + Send + Sync>>) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    /// The value at `index`, if present and of type `T`.
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.values.get(index).and_then(|value| value.downcast_ref())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no parameters were given.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameters(len={})", self.len())
    }
}

/// Build [`Parameters`] from a list of values.
///
/// ```rust
/// use stagework::parameters;
///
/// let params = parameters!["alice".to_owned(), 100u64];
/// assert_eq!(params.get::<u64>(1), Some(&100));
/// ```
#[macro_export]
macro_rules! parameters {
    () => {
        $crate::actor::Parameters::none()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::actor::Parameters::from_values(vec![
            $(Box::new($value) as Box<dyn std::any::Any + Send + Sync>),+
        ])
    };
}

/// Creation descriptor: logical type name, address, and the ordered
/// parameters the instantiator consumes.
#[derive(Debug, Clone)]
pub struct Definition {
    type_name: String,
    address: Address,
    parameters: Parameters,
    mailbox: Option<MailboxKind>,
}

impl Definition {
    /// A definition with no parameters and the stage's default mailbox.
    pub fn new(type_name: impl Into<String>, address: Address) -> Self {
        Self {
            type_name: type_name.into(),
            address,
            parameters: Parameters::none(),
            mailbox: None,
        }
    }

    /// Attach creation parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Override the stage's default mailbox for this actor.
    pub fn with_mailbox(mut self, mailbox: MailboxKind) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    /// Logical type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The actor's address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The ordered creation parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The per-actor mailbox override, if any.
    pub fn mailbox_kind(&self) -> Option<MailboxKind> {
        self.mailbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::OverflowPolicy;

    #[test]
    fn test_parameters_typed_access() {
        let parameters = parameters!["alice".to_owned(), 100u64, true];
        assert_eq!(parameters.len(), 3);
        assert_eq!(parameters.get::<String>(0).map(String::as_str), Some("alice"));
        assert_eq!(parameters.get::<u64>(1), Some(&100));
        assert_eq!(parameters.get::<bool>(2), Some(&true));
    }

    #[test]
    fn test_parameters_wrong_type_or_index() {
        let parameters = parameters![7u32];
        assert_eq!(parameters.get::<u64>(0), None);
        assert_eq!(parameters.get::<u32>(1), None);
    }

    #[test]
    fn test_empty_parameters() {
        let parameters = parameters![];
        assert!(parameters.is_empty());
    }

    #[test]
    fn test_definition_accessors() {
        let address = Address::numeric(9);
        let definition = Definition::new("Counter", address.clone())
            .with_parameters(parameters![5u64])
            .with_mailbox(MailboxKind::Bounded {
                capacity: 8,
                policy: OverflowPolicy::Reject,
            });
        assert_eq!(definition.type_name(), "Counter");
        assert_eq!(definition.address(), &address);
        assert_eq!(definition.parameters().get::<u64>(0), Some(&5));
        assert!(matches!(
            definition.mailbox_kind(),
            Some(MailboxKind::Bounded { capacity: 8, .. })
        ));
    }
}
