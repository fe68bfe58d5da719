//! # Capability Instances
//!
//! A capability is one runtime interpretation of a schema:
//!
//! | Kind | Instance | Shape |
//! |------|----------|-------|
//! | guard | [`Guard<A>`] | `&Value -> bool` |
//! | decoder | [`Decoder<A>`] | `&Value -> Result<Value, DecodeError>` |
//! | encoder | [`Encoder<A>`] | `&Value -> Value` |
//! | arbitrary | [`Arbitrary<A>`] | `&GenContext -> BoxedStrategy<Value>` |
//! | show | [`Show<A>`] | `&Value -> String` |
//!
//! All instances work on `serde_json::Value` and carry `A` only as a
//! phantom, so a capability resolved for `Schema<A>` cannot be handed to
//! code expecting another type without an explicit [`cast`](Guard::cast).
//! Instances are cheap to clone (one `Arc`).

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use proptest::strategy::{BoxedStrategy, Strategy, ValueTree};
use proptest::test_runner::TestRunner;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::GenerationConfig;
use crate::decode_error::DecodeError;
use crate::error::GenerationError;
use crate::refinement::{Bounds, Constraint};

/// The five interpretation kinds a provider can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    Guard,
    Decoder,
    Encoder,
    Arbitrary,
    Show,
}

impl CapabilityKind {
    /// All kinds, in canonical order.
    pub const ALL: [CapabilityKind; 5] = [
        Self::Guard,
        Self::Decoder,
        Self::Encoder,
        Self::Arbitrary,
        Self::Show,
    ];

    /// Lowercase kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guard => "guard",
            Self::Decoder => "decoder",
            Self::Encoder => "encoder",
            Self::Arbitrary => "arbitrary",
            Self::Show => "show",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type GuardFn = dyn Fn(&Value) -> bool + Send + Sync;
pub type DecodeFn = dyn Fn(&Value) -> Result<Value, DecodeError> + Send + Sync;
pub type EncodeFn = dyn Fn(&Value) -> Value + Send + Sync;
pub type ArbitraryFn = dyn Fn(&GenContext) -> BoxedStrategy<Value> + Send + Sync;
pub type ShowFn = dyn Fn(&Value) -> String + Send + Sync;

/// Defines a phantom-typed capability wrapper around one `Arc<dyn Fn>`.
macro_rules! capability {
    ($(#[$meta:meta])* $name:ident, $func:ident, $label:literal) => {
        $(#[$meta])*
        pub struct $name<A = Value> {
            run: Arc<$func>,
            _marker: PhantomData<fn() -> A>,
        }

        impl<A> $name<A> {
            /// Wrap a shared function as this capability.
            pub fn from_arc(run: Arc<$func>) -> Self {
                Self {
                    run,
                    _marker: PhantomData,
                }
            }

            /// The shared function behind this capability.
            pub fn as_arc(&self) -> &Arc<$func> {
                &self.run
            }

            /// Reinterpret the phantom type.
            pub fn cast<B>(self) -> $name<B> {
                $name::from_arc(self.run)
            }

            /// Forget the phantom type.
            pub fn erase(self) -> $name {
                self.cast()
            }
        }

        impl<A> Clone for $name<A> {
            fn clone(&self) -> Self {
                Self::from_arc(Arc::clone(&self.run))
            }
        }

        impl<A> fmt::Debug for $name<A> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($label)
            }
        }
    };
}

capability!(
    /// Structural predicate narrowing untyped input to `A`.
    Guard,
    GuardFn,
    "Guard"
);
capability!(
    /// Partial function from untyped input to the representation of `A`.
    Decoder,
    DecodeFn,
    "Decoder"
);
capability!(
    /// Total function from the representation of `A` to untyped output.
    Encoder,
    EncodeFn,
    "Encoder"
);
capability!(
    /// Builder of proptest strategies producing samples of `A`.
    Arbitrary,
    ArbitraryFn,
    "Arbitrary"
);
capability!(
    /// Total pretty-printer for `A`.
    Show,
    ShowFn,
    "Show"
);

impl<A> Guard<A> {
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::from_arc(Arc::new(f))
    }

    /// Whether `input` is a valid `A`.
    pub fn is(&self, input: &Value) -> bool {
        (self.run)(input)
    }
}

impl<A> Decoder<A> {
    pub fn new(f: impl Fn(&Value) -> Result<Value, DecodeError> + Send + Sync + 'static) -> Self {
        Self::from_arc(Arc::new(f))
    }

    /// Pass input accepted by `guard` through unchanged; report `expected`
    /// for anything else.
    pub fn from_guard(guard: Guard<A>, expected: &'static str) -> Self {
        let guard = guard.erase();
        Self::new(move |input| {
            if guard.is(input) {
                Ok(input.clone())
            } else {
                Err(DecodeError::not_type(expected, input))
            }
        })
    }

    /// Decode `input` into the validated representation of `A`.
    pub fn decode(&self, input: &Value) -> Result<Value, DecodeError> {
        (self.run)(input)
    }
}

impl<A: DeserializeOwned> Decoder<A> {
    /// Decode `input` and deserialize the result into `A`.
    pub fn decode_as(&self, input: &Value) -> Result<A, DecodeError> {
        let decoded = self.decode(input)?;
        serde_json::from_value(decoded)
            .map_err(|_| DecodeError::not_type(std::any::type_name::<A>(), input))
    }
}

impl<A> Encoder<A> {
    pub fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self::from_arc(Arc::new(f))
    }

    /// The encoder that returns its input unchanged.
    pub fn identity() -> Self {
        Self::new(Value::clone)
    }

    /// Encode the representation of `A`.
    pub fn encode(&self, value: &Value) -> Value {
        (self.run)(value)
    }
}

impl<A: Serialize> Encoder<A> {
    /// Serialize a typed `A` and encode it.
    pub fn encode_from(&self, value: &A) -> Result<Value, serde_json::Error> {
        Ok(self.encode(&serde_json::to_value(value)?))
    }
}

impl<A> Show<A> {
    pub fn new(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        Self::from_arc(Arc::new(f))
    }

    /// Render `value` for diagnostics.
    pub fn show(&self, value: &Value) -> String {
        (self.run)(value)
    }
}

/// Everything an arbitrary builder needs to produce a strategy.
#[derive(Debug, Clone)]
pub struct GenContext {
    config: Arc<GenerationConfig>,
    bounds: Bounds,
    depth: usize,
}

impl GenContext {
    /// Context for the root of a schema.
    pub fn root(config: GenerationConfig) -> Self {
        Self {
            config: Arc::new(config),
            bounds: Bounds::default(),
            depth: 0,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Bounds from enclosing refinements of the current node.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Composite nesting depth of the current node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether composites at this depth must stop growing.
    pub fn at_depth_limit(&self) -> bool {
        self.depth >= self.config.max_depth
    }

    /// Context for a child of a composite: bounds reset, depth + 1.
    pub fn descend(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            bounds: Bounds::default(),
            depth: self.depth + 1,
        }
    }

    /// Same bounds one level deeper. Used when following a recursive
    /// reference that did not pass through a composite.
    pub fn deeper(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            bounds: self.bounds,
            depth: self.depth + 1,
        }
    }

    /// Same node with one more refinement applied.
    pub fn narrow(&self, constraint: &Constraint) -> Self {
        Self {
            config: Arc::clone(&self.config),
            bounds: self.bounds.narrow(constraint),
            depth: self.depth,
        }
    }

    /// Inclusive length range for the current node. At the depth limit an
    /// unbounded collection shrinks to its lower bound.
    pub fn length_range(&self) -> (usize, usize) {
        let (lo, hi) = self.bounds.length_range(self.config.max_length);
        if self.at_depth_limit() {
            (lo, lo)
        } else {
            (lo, hi)
        }
    }

    /// Inclusive numeric range for the current node.
    pub fn number_range(&self) -> (f64, f64) {
        self.bounds.number_range(self.config.number_span)
    }
}

impl<A> Arbitrary<A> {
    pub fn new(f: impl Fn(&GenContext) -> BoxedStrategy<Value> + Send + Sync + 'static) -> Self {
        Self::from_arc(Arc::new(f))
    }

    /// Build the strategy for a node in `ctx`.
    pub fn build(&self, ctx: &GenContext) -> BoxedStrategy<Value> {
        (self.run)(ctx)
    }

    /// Build the root strategy under `config`.
    pub fn strategy(&self, config: GenerationConfig) -> BoxedStrategy<Value> {
        self.build(&GenContext::root(config))
    }

    /// Draw `n` samples using the caller's runner as the random source.
    pub fn sample(
        &self,
        config: GenerationConfig,
        runner: &mut TestRunner,
        n: usize,
    ) -> Result<Vec<Value>, GenerationError> {
        let strategy = self.strategy(config);
        (0..n)
            .map(|_| {
                strategy
                    .new_tree(runner)
                    .map(|tree| tree.current())
                    .map_err(|reason| GenerationError::Rejected(reason.message().to_string()))
            })
            .collect()
    }
}

/// A resolved capability of any kind.
#[derive(Debug, Clone)]
pub enum Capability {
    Guard(Guard),
    Decoder(Decoder),
    Encoder(Encoder),
    Arbitrary(Arbitrary),
    Show(Show),
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::Guard(_) => CapabilityKind::Guard,
            Self::Decoder(_) => CapabilityKind::Decoder,
            Self::Encoder(_) => CapabilityKind::Encoder,
            Self::Arbitrary(_) => CapabilityKind::Arbitrary,
            Self::Show(_) => CapabilityKind::Show,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::Just;
    use serde_json::json;

    #[test]
    fn cast_preserves_behavior() {
        let g: Guard<String> = Guard::new(Value::is_string);
        let erased: Guard = g.clone().erase();
        assert!(erased.is(&json!("x")));
        assert!(!g.is(&json!(1)));
    }

    #[test]
    fn decoder_from_guard_reports_expected() {
        let d: Decoder = Decoder::from_guard(Guard::new(Value::is_boolean), "boolean");
        assert_eq!(d.decode(&json!(true)), Ok(json!(true)));
        assert_eq!(d.decode(&json!(0)).unwrap_err().to_string(), "$: expected boolean, got 0");
    }

    #[test]
    fn typed_decoder_from_typed_guard() {
        let guard: Guard<String> = Guard::new(Value::is_string);
        let d = Decoder::<String>::from_guard(guard, "string");
        assert_eq!(d.decode_as(&json!("x")).unwrap(), "x");
        assert!(d.decode(&json!(1)).is_err());
    }

    #[test]
    fn decode_as_deserializes() {
        let d: Decoder<Vec<u8>> = Decoder::new(|v| Ok(v.clone()));
        assert_eq!(d.decode_as(&json!([1, 2])).unwrap(), vec![1u8, 2]);
        assert!(d.decode_as(&json!("no")).is_err());
    }

    #[test]
    fn encode_from_serializes() {
        let e: Encoder<(String, i32)> = Encoder::identity();
        assert_eq!(
            e.encode_from(&("a".to_string(), 1)).unwrap(),
            json!(["a", 1])
        );
    }

    #[test]
    fn sample_draws_from_runner() {
        let a: Arbitrary = Arbitrary::new(|_| Just(json!(7)).boxed());
        let mut runner = TestRunner::deterministic();
        let values = a
            .sample(GenerationConfig::default(), &mut runner, 3)
            .unwrap();
        assert_eq!(values, vec![json!(7); 3]);
    }

    #[test]
    fn descend_resets_bounds_and_deepens() {
        let ctx = GenContext::root(GenerationConfig::default()).narrow(&Constraint::MinLength(2));
        assert_eq!(ctx.bounds().min_length, Some(2));
        let child = ctx.descend();
        assert_eq!(child.bounds(), &Bounds::default());
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn depth_limit_collapses_collections() {
        let cfg = GenerationConfig {
            max_depth: 1,
            ..GenerationConfig::default()
        };
        let ctx = GenContext::root(cfg).descend();
        assert!(ctx.at_depth_limit());
        assert_eq!(ctx.length_range(), (0, 0));
        assert_eq!(ctx.narrow(&Constraint::MinLength(2)).length_range(), (2, 2));
    }
}
