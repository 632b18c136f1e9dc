//! Given-When-Then harness for reducers, plus effect helpers.

#![allow(clippy::module_name_repetitions)]

use rifa_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;

type StateAssertion<S> = Box<dyn FnOnce(&S)>;

type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent reducer test
///
/// Actions given with [`when_action`](Self::when_action) are reduced in
/// order; effect assertions see the effects of the last one only.
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(StorefrontReducer)
///     .with_env(environment)
///     .given_state(state_with_selection(&["12"]))
///     .when_action(StorefrontAction::TicketClicked { id: id("12") })
///     .then_state(|state| assert!(state.selection().is_empty()))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a test for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Environment the reducer runs with
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Append an action (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Assertion about the final state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Reduce every action, run the assertions and hand back the final state
    ///
    /// # Panics
    ///
    /// Panics if state, environment or at least one action is missing, or if
    /// an assertion fails.
    #[allow(clippy::panic, clippy::expect_used)]
    pub fn run(self) -> S {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");
        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
        state
    }
}

/// Execute effects inline and collect the actions they produce
///
/// Delays complete immediately and futures are awaited one after another,
/// so the result is in declaration order regardless of timing. Effects
/// produced by the returned actions are not executed.
pub async fn resolve_effects<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A> {
    let mut queue: VecDeque<Effect<A>> = effects.into_iter().collect();
    let mut actions = Vec::new();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::None => {},
            Effect::Parallel(nested) => {
                for (index, effect) in nested.into_iter().enumerate() {
                    queue.insert(index, effect);
                }
            },
            Effect::Delay { action, .. } => actions.push(*action),
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            },
        }
    }
    actions
}

/// Helper assertions for effects
pub mod assertions {
    use rifa_core::effect::Effect;
    use std::time::Duration;

    /// Assert that nothing needs executing
    ///
    /// # Panics
    ///
    /// Panics if any effect does work.
    #[allow(clippy::panic)]
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)]
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// Assert a Delay effect is present and return its duration and action
    ///
    /// # Panics
    ///
    /// Panics if no Delay effect is found.
    #[allow(clippy::panic)]
    pub fn assert_has_delay_effect<A>(effects: &[Effect<A>]) -> (Duration, &A) {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Delay { duration, action } => Some((*duration, action.as_ref())),
                _ => None,
            })
            .unwrap_or_else(|| panic!("Expected a Delay effect, but none found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rifa_core::{SmallVec, smallvec};
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum Keystroke {
        Typed(char),
        Settled(usize),
    }

    struct Debouncer;

    impl Reducer for Debouncer {
        type State = String;
        type Action = Keystroke;
        type Environment = Duration;

        fn reduce(
            &self,
            state: &mut String,
            action: Keystroke,
            quiet: &Duration,
        ) -> SmallVec<[Effect<Keystroke>; 4]> {
            match action {
                Keystroke::Typed(c) => {
                    state.push(c);
                    smallvec![Effect::Delay {
                        duration: *quiet,
                        action: Box::new(Keystroke::Settled(state.len())),
                    }]
                },
                Keystroke::Settled(_) => smallvec![Effect::None],
            }
        }
    }

    #[test]
    fn effects_come_from_the_last_action() {
        let state = ReducerTest::new(Debouncer)
            .with_env(Duration::from_millis(300))
            .given_state(String::new())
            .when_action(Keystroke::Typed('a'))
            .when_action(Keystroke::Typed('b'))
            .then_state(|s| assert_eq!(s, "ab"))
            .then_effects(|effects| {
                let (duration, action) = assertions::assert_has_delay_effect(effects);
                assert_eq!(duration, Duration::from_millis(300));
                assert_eq!(action, &Keystroke::Settled(2));
            })
            .run();
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn none_is_no_effect() {
        assertions::assert_no_effects::<Keystroke>(&[Effect::None]);
        assertions::assert_no_effects::<Keystroke>(&[]);
    }

    #[tokio::test]
    async fn resolve_effects_keeps_declaration_order() {
        let effects = vec![
            Effect::future(async { Some(1_u8) }),
            Effect::Parallel(vec![
                Effect::Delay {
                    duration: Duration::from_secs(60),
                    action: Box::new(2),
                },
                Effect::future(async { None }),
            ]),
            Effect::future(async { Some(3) }),
        ];
        assert_eq!(resolve_effects(effects).await, vec![1, 2, 3]);
    }
}
