//! Built-in stack presets.

use super::{Extensions, Role, StackConfig};

/// Stack used when no stack is named or the named stack is unknown.
pub const DEFAULT_STACK: &str = "react-js";

/// Safety rules shared by every built-in stack.
const UNIVERSAL_SAFETY: [&str; 3] = [
    "Null Safety: ALWAYS use safe access (`?.`, `!= null`, `is not None`) for nested properties and uninitialized variables",
    "Default Init: prefer valid default values (empty string/array, zero object) over `null`/`undefined`",
    "Async State: EXPLICITLY handle loading (loading flag, retry, blocking); never assume data is immediately available",
];

/// Ids of all built-in stacks.
#[must_use]
pub fn ids() -> Vec<&'static str> {
    vec!["react-js", "python-fastapi"]
}

/// Look up a built-in stack by id.
#[must_use]
pub fn builtin(id: &str) -> Option<StackConfig> {
    match id {
        "react-js" => Some(react_js()),
        "python-fastapi" => Some(python_fastapi()),
        _ => None,
    }
}

/// The default stack.
#[must_use]
pub fn default_stack() -> StackConfig {
    react_js()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn with_universal_safety(extra: &[&str]) -> Vec<String> {
    UNIVERSAL_SAFETY.iter().chain(extra).map(|s| (*s).to_string()).collect()
}

fn react_js() -> StackConfig {
    StackConfig {
        id: "react-js".into(),
        tech_stack: strings(&["React 18", "TailwindCSS", "Javascript (ES6+)", "Fetch API"]),
        extensions: Extensions::new(
            ".jsx",
            &[
                (Role::Presentation, ".jsx"),
                (Role::BusinessLogic, ".js"),
                (Role::Domain, ".js"),
                (Role::Model, ".js"),
            ],
        ),
        prompt_persona: "Senior React Developer - Functional Components & Hooks".into(),
        constraints: strings(&[
            "Naming Conventions: function exports (logic/helpers) MUST be camelCase (e.g. `updateGame`). React components and domain factories MUST be PascalCase.",
            "Import: signature \"export default [Name]\" -> `import Name from ...`; otherwise \"export name\" -> `import { Name } from ...`",
            "Import: use the declared **Implementation** path as the import path",
            "Runtime: import ONLY real constants/functions/classes. NEVER types/interfaces (they do not exist in JS)",
            "Import: relative, ONLY what is necessary for execution",
            "Signature: ReactElement -> use as JSX `<Comp />`",
            "Instantiation: use object literals `{}` or factory functions. NEVER use `new` for project components; use `new` ONLY for built-in classes (Date, Map).",
            "Domain: plain ES6 objects only",
            "Domain Entity Naming: for each entity (e.g. `User`), generate an exported factory function with the SAME PascalCase name (e.g. `export const User = (data) => ({...})`). NO `create`/`make` prefixes.",
            "Domain Objects: MUST be instantiated through domain factory functions (e.g. `Paddle()`). DO NOT build ad-hoc object literals that might miss properties.",
            "Declare hooks ONLY inside a function body",
            "Hooks: custom hooks are named `useName`. Exposed functions MUST be stable (use refs for state access) to prevent consumer re-renders.",
            "Consumption: import the hook, call it to obtain functions. NO direct import of functions living inside hooks",
            "Business Logic: MUST use named exports for functions. DO NOT export a singleton object.",
            "Immutability: always return new objects/arrays when updating state. Never mutate state in place.",
            "Visibility: all capabilities in Business Logic/Domain MUST be exported. Presentation capabilities are internal to the component.",
            "Presentation Components: MUST NOT expose imperative methods (render, update). Behaviour is driven by props/state changes.",
            "NO: TypeScript types, JSDoc, `@typedef` imports, defaultProps (use ES6 default parameters)",
            "Comments: standard syntax only",
        ]),
        safety_constraints: with_universal_safety(&[
            "State Init: synchronous initial state uses lazy init `useState(() => init())`. NEVER `useEffect` for synchronous init",
            "Conditional Render: verify `null`/`undefined` state before passing it to children `{data && <Child data={data} />}`",
            "Default Props: always default in destructuring when the object might be missing",
        ]),
        signature_format: "Output the signature as a TypeScript declaration (pseudo-code) block.\n\
CRITICAL FOR FACTORIES: entity factory functions MUST show the fully expanded return object literal with ALL properties. NEVER return 'any', 'object' or the bare interface name.\n\
Examples:\n\
- Entity Factory: `export const UserEntity: (data?: UserEntity) => { id: string; name: string; isActive: boolean };`\n\
- Function: `export function calculate(a: number): number;`\n\
- Component: `export default function MyComponent(props: { title: string }): React.Element;`\n\
- Hook: `export function useMyHook(): { data: any };`"
            .into(),
        comment_prefix: "//".into(),
    }
}

fn python_fastapi() -> StackConfig {
    StackConfig {
        id: "python-fastapi".into(),
        tech_stack: strings(&["Python 3.10", "FastAPI", "Pydantic"]),
        extensions: Extensions::new(".py", &[]),
        prompt_persona: "Senior Python Backend Developer - FastAPI & Pydantic".into(),
        constraints: strings(&[
            "Export: standard Python classes/functions",
            "Type Hints: Python 3.10+",
            "Models: Pydantic for the domain",
            "Import: absolute or standard relative",
        ]),
        safety_constraints: with_universal_safety(&[
            "Models: default values in Pydantic models to avoid missing fields",
        ]),
        signature_format: "Output the signature as Python type hints (stub file style).\n\
Examples:\n\
- Function: `def calculate(a: int) -> int: ...`\n\
- Class: `class MyModel(BaseModel): ...`\n\
- Variable: `MAX_VALUE: int = ...`"
            .into(),
        comment_prefix: "#".into(),
    }
}
