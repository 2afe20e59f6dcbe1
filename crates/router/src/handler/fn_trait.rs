/// Represents a function whose returned future resolves to the handler output
pub trait FnTrait<Args>: Send + Sync {
    type Output;
    fn call(&self, args: Args) -> Self::Output;
}

/// impl `Fn` for `FnTrait`, From 0 parameters to 8 parameters
///
/// for example, it will impl Fn(A, B) like this:
///```text
/// impl<Func, Fut, A, B> FnTrait<(A, B)> for Func
///    where
///        Func: Fn(A, B) -> Fut + Send + Sync,
///        Fut: std::future::Future,
/// {
///    type Output = Fut;
///
///    #[inline]
///    #[allow(non_snake_case)]
///    fn call(&self, (A, B): (A, B)) -> Self::Output {
///        (self)(A, B)
///    }
/// }
///```
macro_rules! impl_fn_trait_for_fn ({ $($param:ident)* } => {
    impl<Func, Fut, $($param,)*> FnTrait<($($param,)*)> for Func
    where
        Func: Fn($($param),*) -> Fut + Send + Sync,
        Fut: std::future::Future,
    {
        type Output = Fut;

        #[inline]
        #[allow(non_snake_case, reason = "tuple fields are bound by their type parameter names")]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Self::Output {
            (self)($($param,)*)
        }
    }
});

impl_fn_trait_for_fn! {}
impl_fn_trait_for_fn! { A }
impl_fn_trait_for_fn! { A B }
impl_fn_trait_for_fn! { A B C }
impl_fn_trait_for_fn! { A B C D }
impl_fn_trait_for_fn! { A B C D E }
impl_fn_trait_for_fn! { A B C D E F }
impl_fn_trait_for_fn! { A B C D E F G }
impl_fn_trait_for_fn! { A B C D E F G H }

#[cfg(test)]
mod tests {
    use super::FnTrait;
    use crate::PathParams;

    fn assert_is_fn_trait<Args, F: FnTrait<Args>>(_f: F) {
        //noop
    }
    async fn foo0() {}
    async fn foo1(_a: String) {}
    async fn foo2(_a1: String, _a2: Option<String>) {}
    async fn foo3(_a1: u64, _a2: String, _a3: PathParams) {}
    async fn foo8(_a1: String, _a2: String, _a3: String, _a4: String, _a5: String, _a6: String, _a7: String, _a8: String) {}

    #[test]
    fn test_fn_is_fn_trait() {
        assert_is_fn_trait(foo0);
        assert_is_fn_trait(foo1);
        assert_is_fn_trait(foo2);
        assert_is_fn_trait(foo3);
        assert_is_fn_trait(foo8);
        assert_is_fn_trait(|id: String| async move { id });
    }
}
