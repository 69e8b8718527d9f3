use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{EmbeddedElement, InterfaceType, LiteralId, Signature, Type};
use crate::universe::TypeUniverse;

/// Methods by name.
pub type MethodSet = BTreeMap<String, Signature>;

#[derive(Default)]
struct FlattenedInterface {
    methods: MethodSet,
    /// Embedded elements that restrict the type set instead of adding
    /// methods: unions, `~T` terms and non-interface types.
    term_elements: Vec<EmbeddedElement>,
}

struct Embedding {
    value_type: Type,
    /// Methods with pointer receivers are reachable.
    addressable: bool,
}

impl TypeUniverse {
    /// All methods of the interface, including those of embedded interfaces.
    #[must_use]
    pub fn interface_method_set(&self, interface: &InterfaceType) -> MethodSet {
        self.flatten_interface(interface).methods
    }

    fn flatten_interface(&self, interface: &InterfaceType) -> FlattenedInterface {
        let mut flattened = FlattenedInterface::default();
        let mut visiting = HashSet::new();
        self.collect_interface(interface, &mut flattened, &mut visiting);
        flattened
    }

    fn collect_interface(
        &self,
        interface: &InterfaceType,
        flattened: &mut FlattenedInterface,
        visiting: &mut HashSet<LiteralId>,
    ) {
        if !visiting.insert(interface.id.clone()) {
            return;
        }
        for method in &interface.methods {
            flattened
                .methods
                .entry(method.name.clone())
                .or_insert_with(|| method.signature.clone());
        }
        for element in &interface.embedded {
            if let Some(embedded) = element.as_single()
                && let Type::Interface(inner) = self.underlying(embedded)
            {
                self.collect_interface(&inner, flattened, visiting);
                continue;
            }
            flattened.term_elements.push(element.clone());
        }
    }

    /// The method set of a type: value-receiver methods for `T`, all methods
    /// for `*T`, plus methods promoted through embedded fields. A name found
    /// at a shallower embedding depth hides deeper ones; two at the same
    /// depth cancel each other out.
    #[must_use]
    pub fn method_set(&self, value_type: &Type) -> MethodSet {
        let (root, addressable) = match value_type {
            Type::Pointer(element) => (element.as_ref(), true),
            other => (other, false),
        };
        match self.underlying(root) {
            Type::Interface(interface) if !addressable => {
                return self.interface_method_set(&interface);
            }
            Type::Interface(_) | Type::Pointer(_) => return MethodSet::new(),
            _ => {}
        }

        let mut method_set = MethodSet::new();
        let mut decided_names = HashSet::new();
        let mut seen_named_types = HashSet::new();
        let mut current = vec![Embedding {
            value_type: root.clone(),
            addressable,
        }];
        let mut depth = 0usize;

        while !current.is_empty() {
            let mut found: HashMap<String, (usize, Option<Signature>)> = HashMap::new();
            let mut record = |name: &str, signature: Option<Signature>| {
                let entry = found.entry(name.to_string()).or_insert((0, None));
                entry.0 += 1;
                entry.1 = signature;
            };
            let mut next = Vec::new();

            for embedding in current {
                if let Type::Named(named) = &embedding.value_type {
                    if !seen_named_types.insert(named.id.clone()) {
                        continue;
                    }
                    for method in self.declared_methods(named) {
                        let reachable = !method.pointer_receiver || embedding.addressable;
                        record(&method.name, reachable.then_some(method.signature));
                    }
                }
                match self.underlying(&embedding.value_type) {
                    Type::Struct(struct_type) => {
                        for field in struct_type.fields {
                            record(&field.name, None);
                            if !field.embedded {
                                continue;
                            }
                            next.push(match field.field_type {
                                Type::Pointer(element) => Embedding {
                                    value_type: *element,
                                    addressable: true,
                                },
                                field_type => Embedding {
                                    value_type: field_type,
                                    addressable: embedding.addressable,
                                },
                            });
                        }
                    }
                    Type::Interface(interface) if depth > 0 => {
                        for (name, signature) in self.interface_method_set(&interface) {
                            record(&name, Some(signature));
                        }
                    }
                    _ => {}
                }
            }

            for (name, (count, signature)) in found {
                if !decided_names.insert(name.clone()) {
                    continue;
                }
                if count == 1
                    && let Some(signature) = signature
                {
                    method_set.insert(name, signature);
                }
            }
            current = next;
            depth += 1;
        }

        method_set
    }

    /// Whether `value_type` implements `interface`: its method set covers
    /// the interface's methods with identical signatures, and it belongs to
    /// every type-term element of the interface.
    #[must_use]
    pub fn implements(&self, value_type: &Type, interface: &InterfaceType) -> bool {
        let required = self.flatten_interface(interface);
        let available = self.method_set(value_type);
        let has_methods = required.methods.iter().all(|(name, signature)| {
            available
                .get(name)
                .is_some_and(|candidate| self.identical_signatures(signature, candidate))
        });
        has_methods
            && required
                .term_elements
                .iter()
                .all(|element| self.in_type_set(value_type, element))
    }

    fn in_type_set(&self, value_type: &Type, element: &EmbeddedElement) -> bool {
        element.terms.iter().any(|term| {
            if term.tilde {
                return self.identical(
                    &self.underlying(value_type),
                    &self.underlying(&term.term_type),
                );
            }
            match self.underlying(&term.term_type) {
                Type::Interface(inner) => self.implements(value_type, &inner),
                _ => self.identical(value_type, &term.term_type),
            }
        })
    }
}
